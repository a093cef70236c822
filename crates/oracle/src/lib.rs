//! FlightSurety Status Resolver
//!
//! Accepts flight outcomes from principals holding the oracle capability and
//! turns airline-caused delays into payout credits. The oracle capability is
//! kept here, separate from the access gate's authorized set.
//!
//! Also defines `FlightStatusOracle`, the interface of the external reporter,
//! with a `MockOracle` for tests and simulations.

mod error;
mod mock;
mod resolver;
mod types;

pub use error::{OracleError, ResolverError};
pub use mock::MockOracle;
pub use resolver::{Resolution, StatusResolver};
pub use types::FlightStatusOracle;
