//! Journal errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Out of sequence: expected {expected}, got {actual}")]
    OutOfSequence { expected: u64, actual: u64 },

    #[error("Record {sequence} does not link to the journal head")]
    UnlinkedRecord { sequence: u64 },

    #[error("Record {sequence} carries a wrong hash")]
    HashMismatch { sequence: u64 },

    #[error("Invalid event file {file}, line {line}: {reason}")]
    InvalidFile {
        file: String,
        line: usize,
        reason: String,
    },
}
