//! Flight table with key index

use crate::error::CatalogError;
use crate::flight::{Flight, FlightId, FlightKey, FlightStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use surety_core::Principal;
use surety_registry::OperatorRegistry;

/// Insurable flights, in registration order
#[derive(Debug, Clone, Default)]
pub struct FlightCatalog {
    flights: Vec<Flight>,
    index: HashMap<FlightKey, FlightId>,
}

impl FlightCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight for `caller`, who must be a funded operator and the airline.
    pub fn register(
        &mut self,
        registry: &OperatorRegistry,
        caller: &Principal,
        key: FlightKey,
        now: DateTime<Utc>,
    ) -> Result<FlightId, CatalogError> {
        if caller != &key.airline || !registry.is_funded(caller) {
            return Err(CatalogError::NotFunded(caller.clone()));
        }
        if key.code.is_empty() {
            return Err(CatalogError::EmptyCode);
        }
        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicateFlight(key));
        }

        let id = FlightId(self.flights.len());
        tracing::info!(flight = %key, id = id.0, "Flight registered");
        self.index.insert(key.clone(), id);
        self.flights.push(Flight {
            id,
            key,
            status: FlightStatus::Unknown,
            registered_at: now,
        });
        Ok(id)
    }

    /// All flights in insertion order
    pub fn list(&self) -> &[Flight] {
        &self.flights
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn get(&self, key: &FlightKey) -> Result<&Flight, CatalogError> {
        self.lookup(key)
            .ok_or_else(|| CatalogError::NotFound(key.clone()))
    }

    pub fn get_by_id(&self, id: FlightId) -> Result<&Flight, CatalogError> {
        self.flights.get(id.0).ok_or(CatalogError::NotFoundById(id))
    }

    pub fn lookup(&self, key: &FlightKey) -> Option<&Flight> {
        self.index.get(key).map(|id| &self.flights[id.0])
    }

    /// Overwrite the status of a flight. Only the status resolver calls this,
    /// after checking the flight is still unresolved.
    pub fn record_status(&mut self, id: FlightId, status: FlightStatus) -> Result<(), CatalogError> {
        let flight = self
            .flights
            .get_mut(id.0)
            .ok_or(CatalogError::NotFoundById(id))?;
        flight.status = status;
        Ok(())
    }
}
