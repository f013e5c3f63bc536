use std::fs;
use std::io::Write;
use std::str::FromStr;

use clap::ArgMatches;
use serde_json::json;

use crate::color::VertexId;
use crate::error::SolverError;
use crate::search::descent::DescentResult;
use crate::search::tabu_eqcol::TabuParams;

/** run configuration, read from the command line */
#[derive(Debug,Clone)]
pub struct Config {
    /// path of the instance file
    pub input_file: String,
    /// path of the CSV result file (appended)
    pub output_file: String,
    /// seed of every random decision of the run
    pub seed: u64,
    /// forced initial number of colors (max degree + 1 when absent)
    pub initial_k: Option<usize>,
    /// wall-clock cap in seconds
    pub time_limit: u64,
    /// tabu search parameters
    pub tabu: TabuParams,
    /// optional file receiving the witness coloring
    pub sol_file: Option<String>,
    /// optional file receiving run statistics as JSON
    pub perf_file: Option<String>,
}

fn parse_field<T:FromStr>(matches:&ArgMatches, name:&str) -> Result<T, SolverError> {
    let raw = matches.value_of(name).unwrap(); // field carries a default value
    raw.parse::<T>()
        .map_err(|_| SolverError::Config(format!("unable to parse --{}: {}", name, raw)))
}

/** reads command line matches into the run configuration */
pub fn read_params(matches:&ArgMatches) -> Result<Config, SolverError> {
    let initial_k = match matches.value_of("colors") {
        None => None,
        Some(raw) => {
            let k = raw.parse::<usize>()
                .map_err(|_| SolverError::Config(format!("unable to parse --colors: {}", raw)))?;
            if k == 0 {
                return Err(SolverError::Config("--colors must be at least 1".to_string()));
            }
            Some(k)
        }
    };
    let beta:i64 = parse_field(matches, "beta")?;
    if beta < 0 {
        return Err(SolverError::Config("--beta must be non-negative".to_string()));
    }
    let tabu = TabuParams {
        alpha: parse_field(matches, "alpha")?,
        beta,
        aspiration: parse_field::<i64>(matches, "aspiration")? != 0,
        max_iter: parse_field(matches, "max-iter")?,
        perturbation_limit: parse_field(matches, "perturbation-limit")?,
        perturbation_strength: parse_field(matches, "perturbation-strength")?,
    };
    Ok(Config {
        input_file: matches.value_of("instance").unwrap().to_string(),
        output_file: matches.value_of("output").unwrap().to_string(),
        seed: parse_field(matches, "seed")?,
        initial_k,
        time_limit: parse_field(matches, "time")?,
        tabu,
        sol_file: matches.value_of("solution").map(|s| s.to_string()),
        perf_file: matches.value_of("perf").map(|s| s.to_string()),
    })
}

/** appends one result line to the CSV file, writing the header first when
the file is empty */
pub fn append_result(config:&Config, res:&DescentResult, elapsed:f64) -> Result<(), SolverError> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output_file)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "Instance;Seed;Alpha;Beta;P_Limit;P_Str;Asp;SI;SF;Dev(%);Time(s);TotalIter")?;
    }
    let dev = if res.initial_k > 0 {
        100. * (res.initial_k - res.best_k) as f64 / res.initial_k as f64
    } else { 0. };
    writeln!(file, "{};{};{};{};{};{};{};{};{};{:.2};{:.4};{}",
        config.input_file,
        config.seed,
        config.tabu.alpha,
        config.tabu.beta,
        config.tabu.perturbation_limit,
        config.tabu.perturbation_strength,
        config.tabu.aspiration as u8,
        res.initial_k,
        res.best_k,
        dev,
        elapsed,
        res.total_iterations,
    )?;
    Ok(())
}

/** writes a string encoding the solution, one color class per line */
pub fn solution_to_string(solution:&[Vec<VertexId>]) -> String {
    let mut res = String::default();
    for c in solution {
        for v in c {
            res += format!("{} ", v).as_str();
        }
        res += "\n";
    }
    res
}

/// exports the witness coloring and the run statistics when asked to
pub fn export_results(config:&Config, res:&DescentResult, elapsed:f64) -> Result<(), SolverError> {
    if let Some(filename) = &config.sol_file {
        fs::write(filename, solution_to_string(&res.solution))?;
    }
    if let Some(filename) = &config.perf_file {
        let stats = json!({
            "instance": config.input_file,
            "seed": config.seed,
            "initial_k": res.initial_k,
            "best_k": res.best_k,
            "total_iterations": res.total_iterations,
            "time_s": elapsed,
        });
        fs::write(filename, serde_json::to_string(&stats).unwrap())?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Solution;

    fn test_config(output_file:String) -> Config {
        Config {
            input_file: "insts/p4.txt".to_string(),
            output_file,
            seed: 0,
            initial_k: None,
            time_limit: 10,
            tabu: TabuParams::default(),
            sol_file: None,
            perf_file: None,
        }
    }

    fn test_result() -> DescentResult {
        DescentResult {
            initial_k: 3,
            best_k: 2,
            total_iterations: 17,
            solution: vec![vec![0,2], vec![1,3]],
        }
    }

    #[test]
    fn test_csv_header_written_once() {
        let path = std::env::temp_dir().join("eqcol_test_results.csv");
        let _ = fs::remove_file(&path);
        let config = test_config(path.to_str().unwrap().to_string());
        let res = test_result();
        append_result(&config, &res, 0.1234).unwrap();
        append_result(&config, &res, 0.1234).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines:Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Instance;Seed;"));
        assert_eq!(lines[1], "insts/p4.txt;0;0.6;10;1000;0.16;1;3;2;33.33;0.1234;17");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_solution_to_string() {
        let sol:Solution = vec![vec![0,2], vec![1]];
        assert_eq!(solution_to_string(&sol), "0 2 \n1 \n");
    }
}
