//! FlightSurety Flight Catalog
//!
//! Flights registered by funded operators. A flight is identified by
//! (airline, code, departure) and addressed either by that key or by its
//! stable `FlightId` (insertion index).

mod catalog;
mod error;
mod flight;

pub use catalog::FlightCatalog;
pub use error::CatalogError;
pub use flight::{Flight, FlightId, FlightKey, FlightStatus};
