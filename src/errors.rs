use std::error::Error;
use std::fmt;

/// Errors shared by the three simulator binaries.
///
/// Every variant maps to exit code 1; the distinction only matters for the
/// message printed to stderr. There is no recoverable error path: a
/// malformed trace record is not an error, it is treated as end-of-trace
/// (see `trace.rs`).
#[derive(Debug)]
pub enum SimError {
    /// Wrong argument count or an unrecognised predictor/simulator name.
    Usage(String),

    /// The trace file could not be opened.
    Io(std::io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Usage(msg) => write!(f, "Error: {msg}"),
            SimError::Io(err) => write!(f, "Error: {err}"),
        }
    }
}

impl Error for SimError {}

impl From<std::io::Error> for SimError {
    fn from(error: std::io::Error) -> Self {
        SimError::Io(error)
    }
}
