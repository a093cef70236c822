//! Catalog errors

use crate::flight::{FlightId, FlightKey};
use surety_core::Principal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Operator is not funded or does not own the flight: {0}")]
    NotFunded(Principal),

    #[error("Flight already registered: {0}")]
    DuplicateFlight(FlightKey),

    #[error("Flight not found: {0}")]
    NotFound(FlightKey),

    #[error("Flight not found: #{0}")]
    NotFoundById(FlightId),

    #[error("Flight code cannot be empty")]
    EmptyCode,
}
