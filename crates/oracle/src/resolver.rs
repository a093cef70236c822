//! Status reports to payout triggers

use crate::error::ResolverError;
use std::collections::BTreeSet;
use surety_catalog::{FlightCatalog, FlightId, FlightKey, FlightStatus};
use surety_core::Principal;
use surety_insurance::{InsuranceLedger, PayoutSummary};

/// Outcome of an accepted status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub flight: FlightId,
    pub status: FlightStatus,
    /// Present only for compensable statuses
    pub payout: Option<PayoutSummary>,
}

/// Oracle capability set and open status requests
#[derive(Debug, Clone, Default)]
pub struct StatusResolver {
    oracles: BTreeSet<Principal>,
    requests: Vec<FlightId>,
}

impl StatusResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the oracle capability. Returns false if already held.
    pub fn register_oracle(&mut self, oracle: Principal) -> bool {
        let added = self.oracles.insert(oracle.clone());
        tracing::info!(oracle = %oracle, added, "Oracle registered");
        added
    }

    /// Revoke the oracle capability. Returns false if not held.
    pub fn revoke_oracle(&mut self, oracle: &Principal) -> bool {
        let removed = self.oracles.remove(oracle);
        tracing::info!(oracle = %oracle, removed, "Oracle revoked");
        removed
    }

    pub fn is_oracle(&self, principal: &Principal) -> bool {
        self.oracles.contains(principal)
    }

    pub fn oracles(&self) -> impl Iterator<Item = &Principal> {
        self.oracles.iter()
    }

    /// Ask oracles for a verdict on an unresolved flight.
    ///
    /// Returns false if a request for the flight is already open.
    pub fn request_status(&mut self, catalog: &FlightCatalog, key: &FlightKey) -> Result<bool, ResolverError> {
        let flight = catalog
            .lookup(key)
            .ok_or_else(|| ResolverError::UnknownFlight(key.clone()))?;
        if flight.is_resolved() {
            return Err(ResolverError::AlreadyResolved {
                flight: key.clone(),
                status: flight.status,
            });
        }
        if self.requests.contains(&flight.id) {
            return Ok(false);
        }

        self.requests.push(flight.id);
        tracing::info!(flight = %key, "Status requested from oracles");
        Ok(true)
    }

    /// Flights awaiting a verdict, oldest request first
    pub fn pending_requests(&self) -> &[FlightId] {
        &self.requests
    }

    /// Record an oracle verdict. Status is set exactly once; an airline
    /// delay credits every unresolved policy on the flight.
    pub fn report(
        &mut self,
        catalog: &mut FlightCatalog,
        ledger: &mut InsuranceLedger,
        reporter: &Principal,
        key: &FlightKey,
        status: FlightStatus,
    ) -> Result<Resolution, ResolverError> {
        if !self.is_oracle(reporter) {
            tracing::warn!(reporter = %reporter, flight = %key, "Rejected status report: not an oracle");
            return Err(ResolverError::NotOracle(reporter.clone()));
        }
        if status == FlightStatus::Unknown {
            return Err(ResolverError::InvalidStatus(status));
        }
        let flight = catalog
            .lookup(key)
            .ok_or_else(|| ResolverError::UnknownFlight(key.clone()))?;
        if flight.is_resolved() {
            return Err(ResolverError::AlreadyResolved {
                flight: key.clone(),
                status: flight.status,
            });
        }
        let id = flight.id;

        // Credit first: it fails without side effects, the status write cannot fail
        let payout = if status.is_compensable() {
            Some(ledger.credit_payout(id)?)
        } else {
            None
        };
        catalog.record_status(id, status)?;
        self.requests.retain(|pending| *pending != id);

        tracing::info!(flight = %key, status = %status, reporter = %reporter, "Flight status resolved");
        Ok(Resolution {
            flight: id,
            status,
            payout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use surety_core::Amount;
    use surety_registry::{OperatorRegistry, RegistryRules};

    fn p(id: &str) -> Principal {
        Principal::new(id).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    struct Fixture {
        catalog: FlightCatalog,
        ledger: InsuranceLedger,
        resolver: StatusResolver,
        key: FlightKey,
    }

    fn fixture() -> Fixture {
        let registry = OperatorRegistry::with_genesis(RegistryRules::default(), p("AIR"), "Air One");
        let mut catalog = FlightCatalog::new();
        let key = FlightKey::new(p("AIR"), "ND1309", now() + chrono::Duration::hours(6));
        catalog.register(&registry, &p("AIR"), key.clone(), now()).unwrap();

        let mut ledger = InsuranceLedger::default();
        ledger.deposit(Amount::units(10)).unwrap();
        ledger.purchase(&catalog, &key, &p("PAX"), Amount::units(1), now()).unwrap();

        let mut resolver = StatusResolver::new();
        resolver.register_oracle(p("ORACLE"));
        Fixture {
            catalog,
            ledger,
            resolver,
            key,
        }
    }

    #[test]
    fn test_airline_delay_credits_payout() {
        let mut f = fixture();
        let resolution = f
            .resolver
            .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, FlightStatus::AirlineDelay)
            .unwrap();

        assert_eq!(resolution.status, FlightStatus::AirlineDelay);
        assert_eq!(resolution.payout.unwrap().total, Amount::new(dec!(1.5)).unwrap());
        assert_eq!(f.catalog.get(&f.key).unwrap().status, FlightStatus::AirlineDelay);
        assert_eq!(f.ledger.balance_of(&p("PAX")), Amount::new(dec!(1.5)).unwrap());
    }

    #[test]
    fn test_other_statuses_credit_nothing() {
        for status in [
            FlightStatus::OnTime,
            FlightStatus::WeatherDelay,
            FlightStatus::TechnicalDelay,
            FlightStatus::OtherDelay,
        ] {
            let mut f = fixture();
            let resolution = f
                .resolver
                .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, status)
                .unwrap();
            assert!(resolution.payout.is_none());
            assert!(f.ledger.balance_of(&p("PAX")).is_zero());
            assert_eq!(f.catalog.get(&f.key).unwrap().status, status);
        }
    }

    #[test]
    fn test_non_oracle_rejected() {
        let mut f = fixture();
        let result = f
            .resolver
            .report(&mut f.catalog, &mut f.ledger, &p("PAX"), &f.key, FlightStatus::AirlineDelay);
        assert_eq!(result, Err(ResolverError::NotOracle(p("PAX"))));
        assert_eq!(f.catalog.get(&f.key).unwrap().status, FlightStatus::Unknown);

        f.resolver.revoke_oracle(&p("ORACLE"));
        let result = f
            .resolver
            .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, FlightStatus::OnTime);
        assert_eq!(result, Err(ResolverError::NotOracle(p("ORACLE"))));
    }

    #[test]
    fn test_second_report_rejected_and_credits_unchanged() {
        let mut f = fixture();
        f.resolver
            .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, FlightStatus::AirlineDelay)
            .unwrap();
        let before = f.ledger.balance_of(&p("PAX"));

        for status in [FlightStatus::AirlineDelay, FlightStatus::OnTime] {
            let result = f
                .resolver
                .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, status);
            assert_eq!(
                result,
                Err(ResolverError::AlreadyResolved {
                    flight: f.key.clone(),
                    status: FlightStatus::AirlineDelay
                })
            );
        }
        assert_eq!(f.ledger.balance_of(&p("PAX")), before);
    }

    #[test]
    fn test_unknown_flight_and_invalid_status() {
        let mut f = fixture();
        let missing = FlightKey::new(p("AIR"), "ZZ9", now());
        assert_eq!(
            f.resolver
                .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &missing, FlightStatus::OnTime),
            Err(ResolverError::UnknownFlight(missing))
        );
        assert_eq!(
            f.resolver
                .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, FlightStatus::Unknown),
            Err(ResolverError::InvalidStatus(FlightStatus::Unknown))
        );
    }

    #[test]
    fn test_report_before_departure_accepted() {
        let mut f = fixture();
        // Departure is six hours after `now()`; nothing checks the clock here
        assert!(f
            .resolver
            .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, FlightStatus::OnTime)
            .is_ok());
    }

    #[test]
    fn test_requests_open_and_close() {
        let mut f = fixture();
        assert!(f.resolver.request_status(&f.catalog, &f.key).unwrap());
        assert!(!f.resolver.request_status(&f.catalog, &f.key).unwrap());
        assert_eq!(f.resolver.pending_requests().len(), 1);

        f.resolver
            .report(&mut f.catalog, &mut f.ledger, &p("ORACLE"), &f.key, FlightStatus::OnTime)
            .unwrap();
        assert!(f.resolver.pending_requests().is_empty());

        assert!(matches!(
            f.resolver.request_status(&f.catalog, &f.key),
            Err(ResolverError::AlreadyResolved { .. })
        ));
    }
}
