//! Insurance ledger errors

use crate::policy::PolicyId;
use surety_catalog::FlightKey;
use surety_core::{Amount, Principal};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsuranceError {
    #[error("Unknown flight: {0}")]
    UnknownFlight(FlightKey),

    #[error("Flight already departed: {0}")]
    FlightAlreadyDeparted(FlightKey),

    #[error("Flight already resolved: {0}")]
    FlightResolved(FlightKey),

    #[error("Premium exceeds maximum: would be {attempted}, maximum {maximum}")]
    PremiumExceedsMax { attempted: Amount, maximum: Amount },

    #[error("No balance to withdraw for {0}")]
    NoBalance(Principal),

    #[error("Unknown policy: {0:?}")]
    UnknownPolicy(PolicyId),

    #[error("Amount overflow")]
    Overflow,
}
