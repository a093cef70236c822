//! Resolver and oracle errors

use surety_catalog::{CatalogError, FlightKey, FlightStatus};
use surety_core::Principal;
use surety_insurance::InsuranceError;
use thiserror::Error;

/// Errors from `StatusResolver`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Caller does not hold the oracle capability: {0}")]
    NotOracle(Principal),

    #[error("Unknown flight: {0}")]
    UnknownFlight(FlightKey),

    #[error("Flight already resolved: {flight} is {status}")]
    AlreadyResolved { flight: FlightKey, status: FlightStatus },

    #[error("Not a reportable status: {0}")]
    InvalidStatus(FlightStatus),

    #[error("Payout failed: {0}")]
    Insurance(#[from] InsuranceError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors from an external status oracle
#[derive(Error, Debug)]
pub enum OracleError {
    /// The oracle has no data for this flight
    #[error("Flight not covered by oracle: {flight}")]
    NotCovered { flight: FlightKey },

    /// External oracle connection failed
    #[error("Oracle connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
