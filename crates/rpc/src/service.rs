//! Async facade over a shared `AppContext`
//!
//! Operations are serialized through one lock, so concurrent callers see the
//! same sequential order the journal records.

use crate::context::AppContext;
use crate::error::SuretyError;
use std::sync::Arc;
use surety_catalog::{FlightKey, FlightStatus};
use surety_gate::Origin;
use surety_oracle::{FlightStatusOracle, Resolution};
use tokio::sync::Mutex;

/// Cloneable handle to the ledger
#[derive(Clone)]
pub struct LedgerService {
    ctx: Arc<Mutex<AppContext>>,
}

impl LedgerService {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx: Arc::new(Mutex::new(ctx)),
        }
    }

    /// Run `f` with exclusive access to the context
    pub async fn with_context<T>(&self, f: impl FnOnce(&mut AppContext) -> T) -> T {
        let mut ctx = self.ctx.lock().await;
        f(&mut ctx)
    }

    /// Ask `oracle` for a verdict and submit it on behalf of `origin`.
    ///
    /// The oracle is queried without holding the lock. Returns `None` while
    /// the oracle has no verdict yet.
    pub async fn relay_oracle(
        &self,
        oracle: &dyn FlightStatusOracle,
        origin: &Origin,
        flight: &FlightKey,
    ) -> Result<Option<Resolution>, SuretyError> {
        let status = oracle.fetch_status(flight).await?;
        if status == FlightStatus::Unknown {
            tracing::debug!(oracle = oracle.name(), flight = %flight, "No verdict yet");
            return Ok(None);
        }

        tracing::info!(oracle = oracle.name(), flight = %flight, status = %status, "Relaying oracle verdict");
        let resolution = self
            .with_context(|ctx| ctx.report_status(origin, flight, status))
            .await?;
        Ok(Some(resolution))
    }

    /// Relay verdicts for every open status request.
    ///
    /// Flights the oracle cannot answer for stay pending; the first other
    /// failure aborts the run.
    pub async fn relay_pending(
        &self,
        oracle: &dyn FlightStatusOracle,
        origin: &Origin,
    ) -> Result<Vec<Resolution>, SuretyError> {
        let pending: Vec<FlightKey> = self
            .with_context(|ctx| ctx.pending_requests().into_iter().map(|f| f.key.clone()).collect())
            .await;

        let mut resolutions = Vec::new();
        for flight in pending {
            match self.relay_oracle(oracle, origin, &flight).await {
                Ok(Some(resolution)) => resolutions.push(resolution),
                Ok(None) => {}
                Err(SuretyError::Oracle(e)) => {
                    tracing::warn!(oracle = oracle.name(), flight = %flight, error = %e, "Oracle skipped flight");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(resolutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use surety_core::{Amount, Principal};
    use surety_oracle::MockOracle;
    use crate::config::SuretyConfig;

    fn p(id: &str) -> Principal {
        Principal::new(id).unwrap()
    }

    fn service_with_flight() -> (LedgerService, FlightKey) {
        let config = SuretyConfig {
            oracles: vec![p("ORACLE")],
            ..SuretyConfig::default()
        };
        let mut ctx = AppContext::in_memory(config).unwrap();
        let departure = Utc::now() + Duration::hours(4);
        let origin = Origin::new(p("APP"), p("OWNER"));
        ctx.register_flight(&origin, "ND1309", departure).unwrap();
        let key = FlightKey::new(p("OWNER"), "ND1309", departure);
        ctx.purchase(&Origin::new(p("APP"), p("PAX")), &key, Amount::units(1)).unwrap();
        (LedgerService::new(ctx), key)
    }

    #[tokio::test]
    async fn test_relay_resolves_flight() {
        let (service, key) = service_with_flight();
        let oracle = MockOracle::default();
        oracle.set_status(key.clone(), FlightStatus::AirlineDelay);

        let origin = Origin::new(p("APP"), p("ORACLE"));
        let resolution = service.relay_oracle(&oracle, &origin, &key).await.unwrap().unwrap();
        assert_eq!(resolution.status, FlightStatus::AirlineDelay);

        let balance = service.with_context(|ctx| ctx.balance_of(&p("PAX"))).await;
        assert_eq!(balance.to_string(), "1.5");
    }

    #[tokio::test]
    async fn test_relay_without_verdict_is_noop() {
        let (service, key) = service_with_flight();
        let oracle = MockOracle::default();
        oracle.set_status(key.clone(), FlightStatus::Unknown);

        let origin = Origin::new(p("APP"), p("ORACLE"));
        assert!(service.relay_oracle(&oracle, &origin, &key).await.unwrap().is_none());
        let status = service
            .with_context(|ctx| ctx.get_flight(&key).map(|f| f.status))
            .await
            .unwrap();
        assert_eq!(status, FlightStatus::Unknown);
    }

    #[tokio::test]
    async fn test_relay_pending_skips_uncovered_flights() {
        let (service, key) = service_with_flight();
        let origin = Origin::new(p("APP"), p("PAX"));
        service
            .with_context(|ctx| ctx.request_status(&origin, &key))
            .await
            .unwrap();

        let oracle = MockOracle::default();
        let relayer = Origin::new(p("APP"), p("ORACLE"));
        let resolutions = service.relay_pending(&oracle, &relayer).await.unwrap();
        assert!(resolutions.is_empty());
        assert_eq!(service.with_context(|ctx| ctx.pending_requests().len()).await, 1);

        oracle.set_status(key.clone(), FlightStatus::OnTime);
        let resolutions = service.relay_pending(&oracle, &relayer).await.unwrap();
        assert_eq!(resolutions.len(), 1);
        assert_eq!(service.with_context(|ctx| ctx.pending_requests().len()).await, 0);
    }
}
