//! FlightSurety RPC - ledger facade
//!
//! `AppContext` wires the access gate, operator registry, flight catalog,
//! insurance ledger and status resolver into one state machine. Every
//! committed mutation is journaled and replayed on startup.
//! `LedgerService` serializes concurrent async callers onto one context.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod service;

pub use config::SuretyConfig;
pub use context::AppContext;
pub use error::{ErrorKind, SuretyError};
pub use service::LedgerService;
