//! Hash chain utilities for journal integrity

use crate::command::JournalRecord;
use crate::error::EventError;
use sha2::{Digest, Sha256};
use std::fmt;

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

/// Position of the newest record in a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    pub sequence: u64,
    pub hash: String,
}

impl ChainHead {
    /// Head of an empty journal
    pub fn genesis() -> Self {
        Self {
            sequence: 0,
            hash: GENESIS_HASH.to_string(),
        }
    }

    pub fn of(record: &JournalRecord) -> Self {
        Self {
            sequence: record.sequence,
            hash: record.hash.clone(),
        }
    }

    /// Whether `record` directly extends this head
    pub fn is_extended_by(&self, record: &JournalRecord) -> bool {
        record.sequence == self.sequence + 1 && record.prev_hash == self.hash
    }
}

impl Default for ChainHead {
    fn default() -> Self {
        Self::genesis()
    }
}

/// Calculate SHA256 hash of record content (excluding the hash field itself)
pub fn calculate_record_hash(record: &JournalRecord) -> Result<String, EventError> {
    let mut hasher = Sha256::new();

    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.timestamp.to_rfc3339().as_bytes());
    hasher.update(record.correlation_id.as_bytes());
    hasher.update(record.origin.gateway.as_str().as_bytes());
    hasher.update(record.origin.caller.as_str().as_bytes());

    // Struct field order is fixed, so the JSON form is deterministic
    let command = serde_json::to_vec(&record.command)?;
    hasher.update(&command);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify hash chain integrity
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), ChainError> {
    let mut prev_hash = GENESIS_HASH.to_string();

    for (i, record) in records.iter().enumerate() {
        let expected_sequence = i as u64 + 1;
        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            });
        }

        if record.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            });
        }

        let calculated = calculate_record_hash(record).map_err(|e| ChainError::Unhashable {
            sequence: record.sequence,
            reason: e.to_string(),
        })?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            });
        }

        prev_hash = record.hash.clone();
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },
    InvalidSequence {
        expected: u64,
        actual: u64,
    },
    Unhashable {
        sequence: u64,
        reason: String,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::BrokenLink {
                sequence,
                expected,
                actual,
            } => write!(
                f,
                "Broken link at seq {}: expected prev_hash '{}', got '{}'",
                sequence, expected, actual
            ),
            ChainError::InvalidHash {
                sequence,
                expected,
                actual,
            } => write!(
                f,
                "Invalid hash at seq {}: expected '{}', got '{}'",
                sequence, expected, actual
            ),
            ChainError::InvalidSequence { expected, actual } => {
                write!(f, "Invalid sequence: expected {}, got {}", expected, actual)
            }
            ChainError::Unhashable { sequence, reason } => {
                write!(f, "Cannot hash record at seq {}: {}", sequence, reason)
            }
        }
    }
}

impl std::error::Error for ChainError {}
