//! External oracle interface

use async_trait::async_trait;
use surety_catalog::{FlightKey, FlightStatus};

use crate::OracleError;

/// Source of ground-truth flight outcomes
///
/// Implementations can be:
/// - MockOracle: fixed verdicts for tests and simulations
/// - an adapter over a flight data provider
#[async_trait]
pub trait FlightStatusOracle: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Current verdict for a flight. `Unknown` means no verdict yet.
    async fn fetch_status(&self, flight: &FlightKey) -> Result<FlightStatus, OracleError>;
}
