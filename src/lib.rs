//! Tabu-search solver for the Equitable Coloring Problem (ECP)

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// coloring solutions and checker
pub mod color;

/// immutable graph instances & reading the edge-list format
pub mod instance;

/// errors surfaced to the executable
pub mod error;

/// helper and utility methods for executables
pub mod util;

/// search procedures for the equitable coloring problem
pub mod search;
