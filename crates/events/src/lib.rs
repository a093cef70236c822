//! FlightSurety Journal - JSONL event store
//!
//! Every committed mutating command is appended as one JSON line, chained to
//! its predecessor by SHA-256. Replaying the journal rebuilds ledger state.

pub mod command;
pub mod error;
pub mod hash;
pub mod reader;
pub mod store;

pub use command::{Command, JournalRecord};
pub use error::EventError;
pub use hash::{calculate_record_hash, verify_chain, ChainError, ChainHead, GENESIS_HASH};
pub use reader::EventReader;
pub use store::EventStore;
