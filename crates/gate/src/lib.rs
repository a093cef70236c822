//! FlightSurety Access Gate
//!
//! Decides whether a request may mutate ledger state at all:
//! - the system must be operational
//! - the request must arrive through an authorized gateway
//!
//! The gate is owned by a single controller principal, who alone may toggle
//! the operational flag and change the authorized set.

mod error;
mod gate;

pub use error::GateError;
pub use gate::{AccessGate, Origin};
