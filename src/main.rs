//! Executable of the equitable coloring tabu solver

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

use std::error::Error;
use std::rc::Rc;
use std::time::Instant;

use clap::{App, Arg};
use dogs::search_algorithm::TimeStoppingCriterion;

use eqcol::instance::Instance;
use eqcol::search::descent::descent_eqcol;
use eqcol::util::{append_result, export_results, read_params};

/**
reads an instance, runs the descent within the time limit, and appends the
run summary to the CSV result file.
*/
pub fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new("eqcol")
        .about("tabu search solver for the equitable graph coloring problem")
        .arg(Arg::with_name("instance")
            .short("i").long("instance")
            .takes_value(true).required(true)
            .help("instance file: first line `n m`, then one 1-indexed edge per line"))
        .arg(Arg::with_name("output")
            .short("o").long("output")
            .takes_value(true).required(true)
            .help("CSV result file (append mode)"))
        .arg(Arg::with_name("seed")
            .long("seed").takes_value(true).default_value("0")
            .help("seed of every random decision of the run"))
        .arg(Arg::with_name("colors")
            .short("k").long("colors").takes_value(true)
            .help("initial number of colors (defaults to max degree + 1)"))
        .arg(Arg::with_name("alpha")
            .long("alpha").takes_value(true).default_value("0.6")
            .help("tabu tenure multiplier"))
        .arg(Arg::with_name("beta")
            .long("beta").takes_value(true).default_value("10")
            .help("tabu tenure random span (inclusive)"))
        .arg(Arg::with_name("aspiration")
            .long("aspiration").takes_value(true).default_value("1")
            .help("1 accepts tabu moves that improve the best objective, 0 disables"))
        .arg(Arg::with_name("time")
            .short("t").long("time").takes_value(true).default_value("1000")
            .help("wall-clock limit in seconds"))
        .arg(Arg::with_name("max-iter")
            .long("max-iter").takes_value(true).default_value("1000000")
            .help("iteration cap of each tabu run"))
        .arg(Arg::with_name("perturbation-limit")
            .long("perturbation-limit").takes_value(true).default_value("1000")
            .help("iterations without improvement before a perturbation"))
        .arg(Arg::with_name("perturbation-strength")
            .long("perturbation-strength").takes_value(true).default_value("0.16")
            .help("fraction of the vertices swapped during a perturbation"))
        .arg(Arg::with_name("solution")
            .short("s").long("solution").takes_value(true)
            .help("optional file receiving the witness coloring"))
        .arg(Arg::with_name("perf")
            .long("perf").takes_value(true)
            .help("optional file receiving run statistics as JSON"))
        .get_matches();
    let config = read_params(&matches)?;
    println!("reading instance: {}...", config.input_file);
    let inst = Rc::new(Instance::from_file(&config.input_file)?);
    inst.display_statistics();
    println!("=======================");
    let stop = TimeStoppingCriterion::new(config.time_limit as f32);
    let start = Instant::now();
    let result = descent_eqcol(inst, &config.tabu, config.seed, config.initial_k, &stop);
    let elapsed = start.elapsed().as_secs_f64();
    append_result(&config, &result, elapsed)?;
    export_results(&config, &result, elapsed)?;
    println!("{}: k {} -> {} | seed {} | {:.4}s | {} iterations",
        config.input_file, result.initial_k, result.best_k,
        config.seed, elapsed, result.total_iterations
    );
    Ok(())
}
