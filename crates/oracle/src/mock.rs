//! Mock Oracle for testing
//!
//! Stores fixed verdicts that can be updated programmatically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use surety_catalog::{FlightKey, FlightStatus};

use crate::error::OracleError;
use crate::types::FlightStatusOracle;

/// Mock flight status oracle
pub struct MockOracle {
    name: String,
    verdicts: RwLock<HashMap<FlightKey, FlightStatus>>,
}

impl MockOracle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verdicts: RwLock::new(HashMap::new()),
        }
    }

    /// Set the verdict returned for a flight
    pub fn set_status(&self, flight: FlightKey, status: FlightStatus) {
        let mut verdicts = self.verdicts.write().unwrap_or_else(|e| e.into_inner());
        verdicts.insert(flight, status);
    }

    /// Forget a flight (for testing the not-covered error)
    pub fn remove(&self, flight: &FlightKey) {
        let mut verdicts = self.verdicts.write().unwrap_or_else(|e| e.into_inner());
        verdicts.remove(flight);
    }

    pub fn flight_count(&self) -> usize {
        self.verdicts.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new("mock")
    }
}

#[async_trait]
impl FlightStatusOracle for MockOracle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_status(&self, flight: &FlightKey) -> Result<FlightStatus, OracleError> {
        let verdicts = self.verdicts.read().unwrap_or_else(|e| e.into_inner());
        verdicts
            .get(flight)
            .copied()
            .ok_or_else(|| OracleError::NotCovered {
                flight: flight.clone(),
            })
    }
}
