//! Error kinds reported by the executable (configuration, I/O, instance).

use std::error::Error;
use std::fmt;

/// errors that abort a run before the search starts
#[derive(Debug)]
pub enum SolverError {
    /// unknown or malformed command-line argument
    Config(String),
    /// input unreadable or output not writable
    Io(std::io::Error),
    /// malformed instance: bad header, self-loop, endpoint out of range
    Instance(String),
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> SolverError {
        SolverError::Io(e)
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Instance(msg) => write!(f, "instance error: {}", msg),
        }
    }
}

impl Error for SolverError {}
