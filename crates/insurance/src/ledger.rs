//! Premium escrow and payout accounting

use crate::error::InsuranceError;
use crate::policy::{Policy, PolicyId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surety_catalog::{FlightCatalog, FlightId, FlightKey};
use surety_core::{Amount, Principal};

/// Fixed underwriting terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceTerms {
    /// Cap on cumulative premium per (flight, passenger)
    pub max_premium: Amount,

    /// Credit = premium * multiplier on an airline-caused delay
    pub payout_multiplier: Decimal,
}

impl Default for InsuranceTerms {
    fn default() -> Self {
        Self {
            max_premium: Amount::units(1),
            payout_multiplier: Decimal::new(15, 1), // 1.5
        }
    }
}

/// What a payout run did for one flight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayoutSummary {
    pub credited: Vec<(Principal, Amount)>,
    pub total: Amount,
}

/// A withdrawal taken from the ledger. Journaled again as a reversal when
/// the transfer it funds does not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub passenger: Principal,
    pub amount: Amount,
    cleared: Vec<(PolicyId, Amount)>,
}

/// Policy table, payout credits and pooled funds
#[derive(Debug, Clone)]
pub struct InsuranceLedger {
    terms: InsuranceTerms,
    policies: Vec<Policy>,
    index: HashMap<(FlightId, Principal), PolicyId>,
    by_flight: HashMap<FlightId, Vec<PolicyId>>,
    by_passenger: HashMap<Principal, Vec<PolicyId>>,
    /// Always the sum of the passenger's unwithdrawn credits
    balances: HashMap<Principal, Amount>,
    /// Funding + premiums - withdrawals. Goes negative when payouts outrun
    /// what has been paid in; withdrawals are never gated on it.
    pool: Decimal,
}

impl InsuranceLedger {
    pub fn new(terms: InsuranceTerms) -> Self {
        Self {
            terms,
            policies: Vec::new(),
            index: HashMap::new(),
            by_flight: HashMap::new(),
            by_passenger: HashMap::new(),
            balances: HashMap::new(),
            pool: Decimal::ZERO,
        }
    }

    pub fn terms(&self) -> &InsuranceTerms {
        &self.terms
    }

    /// Escrow `amount` on the passenger's policy for `key`, creating it on first purchase.
    pub fn purchase(
        &mut self,
        catalog: &FlightCatalog,
        key: &FlightKey,
        passenger: &Principal,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<PolicyId, InsuranceError> {
        let flight = catalog
            .lookup(key)
            .ok_or_else(|| InsuranceError::UnknownFlight(key.clone()))?;
        if flight.has_departed(now) {
            return Err(InsuranceError::FlightAlreadyDeparted(key.clone()));
        }
        if flight.is_resolved() {
            return Err(InsuranceError::FlightResolved(key.clone()));
        }

        let flight_id = flight.id;
        let existing = self.index.get(&(flight_id, passenger.clone())).copied();
        let paid = existing.map_or(Amount::ZERO, |id| self.policies[id.0].premium);
        let attempted = paid.checked_add(&amount).ok_or(InsuranceError::Overflow)?;
        if attempted > self.terms.max_premium {
            return Err(InsuranceError::PremiumExceedsMax {
                attempted,
                maximum: self.terms.max_premium,
            });
        }
        let pool = self.pool.checked_add(amount.value()).ok_or(InsuranceError::Overflow)?;

        let id = match existing {
            Some(id) => id,
            None => self.open_policy(flight_id, passenger.clone()),
        };
        self.policies[id.0].premium = attempted;
        self.pool = pool;

        tracing::info!(flight = %key, passenger = %passenger, premium = %attempted, "Premium escrowed");
        Ok(id)
    }

    fn open_policy(&mut self, flight: FlightId, passenger: Principal) -> PolicyId {
        let id = PolicyId(self.policies.len());
        self.policies.push(Policy {
            id,
            flight,
            passenger: passenger.clone(),
            premium: Amount::ZERO,
            payout_credit: Amount::ZERO,
            resolved: false,
        });
        self.index.insert((flight, passenger.clone()), id);
        self.by_flight.entry(flight).or_default().push(id);
        self.by_passenger.entry(passenger).or_default().push(id);
        id
    }

    /// Credit every unresolved policy on `flight`. Each policy is resolved at
    /// most once, so a repeated call credits nothing.
    pub fn credit_payout(&mut self, flight: FlightId) -> Result<PayoutSummary, InsuranceError> {
        let ids = self.by_flight.get(&flight).cloned().unwrap_or_default();

        // Compute every credit and resulting balance before touching state
        let mut credits = Vec::new();
        let mut balances: HashMap<Principal, Amount> = HashMap::new();
        let mut total = Amount::ZERO;
        for id in ids {
            let policy = &self.policies[id.0];
            if policy.resolved {
                continue;
            }
            let credit = policy
                .premium
                .checked_scale(self.terms.payout_multiplier)
                .ok_or(InsuranceError::Overflow)?;
            total = total.checked_add(&credit).ok_or(InsuranceError::Overflow)?;
            if !credit.is_zero() {
                let current = balances
                    .get(&policy.passenger)
                    .copied()
                    .unwrap_or_else(|| self.balance_of(&policy.passenger));
                let balance = current.checked_add(&credit).ok_or(InsuranceError::Overflow)?;
                balances.insert(policy.passenger.clone(), balance);
            }
            credits.push((id, credit));
        }

        let mut summary = PayoutSummary {
            credited: Vec::new(),
            total,
        };
        for (id, credit) in credits {
            let policy = &mut self.policies[id.0];
            policy.resolved = true;
            if !credit.is_zero() {
                policy.payout_credit = credit;
                summary.credited.push((policy.passenger.clone(), credit));
            }
        }
        self.balances.extend(balances);

        tracing::info!(flight = %flight, policies = summary.credited.len(), total = %summary.total, "Payouts credited");
        Ok(summary)
    }

    /// Check, zero every credit, and return the amount to transfer.
    ///
    /// Fails only when the passenger has nothing to withdraw.
    pub fn withdraw(&mut self, passenger: &Principal) -> Result<Withdrawal, InsuranceError> {
        let amount = self.balance_of(passenger);
        if amount.is_zero() {
            return Err(InsuranceError::NoBalance(passenger.clone()));
        }
        let pool = self.pool.checked_sub(amount.value()).ok_or(InsuranceError::Overflow)?;

        let cleared: Vec<(PolicyId, Amount)> = self
            .by_passenger
            .get(passenger)
            .into_iter()
            .flatten()
            .map(|&id| (id, self.policies[id.0].payout_credit))
            .filter(|(_, credit)| !credit.is_zero())
            .collect();
        for &(id, _) in &cleared {
            self.policies[id.0].payout_credit = Amount::ZERO;
        }
        self.balances.remove(passenger);
        self.pool = pool;

        tracing::info!(passenger = %passenger, amount = %amount, "Balance withdrawn");
        Ok(Withdrawal {
            passenger: passenger.clone(),
            amount,
            cleared,
        })
    }

    /// Restore the credits cleared by `withdrawal` after a failed transfer.
    pub fn revert_withdrawal(&mut self, withdrawal: &Withdrawal) -> Result<(), InsuranceError> {
        let balance = self
            .balance_of(&withdrawal.passenger)
            .checked_add(&withdrawal.amount)
            .ok_or(InsuranceError::Overflow)?;
        let pool = self
            .pool
            .checked_add(withdrawal.amount.value())
            .ok_or(InsuranceError::Overflow)?;
        if let Some(&(id, _)) = withdrawal.cleared.iter().find(|(id, _)| id.0 >= self.policies.len()) {
            return Err(InsuranceError::UnknownPolicy(id));
        }

        for &(id, credit) in &withdrawal.cleared {
            self.policies[id.0].payout_credit = credit;
        }
        self.balances.insert(withdrawal.passenger.clone(), balance);
        self.pool = pool;

        tracing::warn!(passenger = %withdrawal.passenger, amount = %withdrawal.amount, "Withdrawal reverted");
        Ok(())
    }

    /// Add operator funding to the pool.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), InsuranceError> {
        self.pool = self.pool.checked_add(amount.value()).ok_or(InsuranceError::Overflow)?;
        Ok(())
    }

    /// Sum of unwithdrawn credits
    pub fn balance_of(&self, passenger: &Principal) -> Amount {
        self.balances.get(passenger).copied().unwrap_or(Amount::ZERO)
    }

    pub fn policy(&self, flight: FlightId, passenger: &Principal) -> Option<&Policy> {
        self.index
            .get(&(flight, passenger.clone()))
            .map(|id| &self.policies[id.0])
    }

    pub fn policies_for(&self, flight: FlightId) -> Vec<&Policy> {
        self.by_flight
            .get(&flight)
            .into_iter()
            .flatten()
            .map(|id| &self.policies[id.0])
            .collect()
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn pool(&self) -> Decimal {
        self.pool
    }
}

impl Default for InsuranceLedger {
    fn default() -> Self {
        Self::new(InsuranceTerms::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use surety_catalog::FlightStatus;
    use surety_registry::{OperatorRegistry, RegistryRules};

    fn p(id: &str) -> Principal {
        Principal::new(id).unwrap()
    }

    fn amt(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    struct Fixture {
        catalog: FlightCatalog,
        ledger: InsuranceLedger,
        key: FlightKey,
        id: FlightId,
    }

    fn fixture() -> Fixture {
        let registry = OperatorRegistry::with_genesis(RegistryRules::default(), p("AIR"), "Air One");
        let mut catalog = FlightCatalog::new();
        let key = FlightKey::new(p("AIR"), "ND1309", now() + chrono::Duration::hours(6));
        let id = catalog.register(&registry, &p("AIR"), key.clone(), now()).unwrap();
        let mut ledger = InsuranceLedger::default();
        ledger.deposit(Amount::units(10)).unwrap();
        Fixture { catalog, ledger, key, id }
    }

    #[test]
    fn test_purchase_tops_up_single_policy() {
        let mut f = fixture();
        let first = f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.3)), now()).unwrap();
        let second = f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.5)), now()).unwrap();

        assert_eq!(first, second);
        assert_eq!(f.ledger.policies().len(), 1);
        assert_eq!(f.ledger.policy(f.id, &p("PAX")).unwrap().premium, amt(dec!(0.8)));
        assert_eq!(f.ledger.pool(), dec!(10.8));
    }

    #[test]
    fn test_premium_cap_is_cumulative() {
        let mut f = fixture();
        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.6)), now()).unwrap();

        let result = f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.5)), now());
        assert_eq!(
            result,
            Err(InsuranceError::PremiumExceedsMax {
                attempted: amt(dec!(1.1)),
                maximum: Amount::units(1)
            })
        );
        assert_eq!(f.ledger.policy(f.id, &p("PAX")).unwrap().premium, amt(dec!(0.6)));
        assert_eq!(f.ledger.pool(), dec!(10.6));

        // Exactly at the cap is fine
        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.4)), now()).unwrap();
        assert_eq!(f.ledger.policy(f.id, &p("PAX")).unwrap().premium, Amount::units(1));
    }

    #[test]
    fn test_purchase_unknown_or_departed_flight() {
        let mut f = fixture();
        let missing = FlightKey::new(p("AIR"), "XX1", now());
        assert_eq!(
            f.ledger.purchase(&f.catalog, &missing, &p("PAX"), Amount::units(1), now()),
            Err(InsuranceError::UnknownFlight(missing))
        );

        // At departure is still allowed, after is not
        let departure = f.key.departure;
        assert!(f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.1)), departure).is_ok());
        let late = departure + chrono::Duration::seconds(1);
        assert_eq!(
            f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.1)), late),
            Err(InsuranceError::FlightAlreadyDeparted(f.key.clone()))
        );
    }

    #[test]
    fn test_purchase_after_resolution_rejected() {
        let mut f = fixture();
        f.catalog.record_status(f.id, FlightStatus::OnTime).unwrap();
        assert_eq!(
            f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.1)), now()),
            Err(InsuranceError::FlightResolved(f.key.clone()))
        );
    }

    #[test]
    fn test_credit_payout_once() {
        let mut f = fixture();
        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.8)), now()).unwrap();
        f.ledger.purchase(&f.catalog, &f.key, &p("BOB"), amt(dec!(0.2)), now()).unwrap();

        let summary = f.ledger.credit_payout(f.id).unwrap();
        assert_eq!(summary.total, amt(dec!(1.5)));
        assert_eq!(summary.credited.len(), 2);
        assert_eq!(f.ledger.balance_of(&p("PAX")), amt(dec!(1.2)));
        assert_eq!(f.ledger.balance_of(&p("BOB")), amt(dec!(0.3)));

        let again = f.ledger.credit_payout(f.id).unwrap();
        assert_eq!(again, PayoutSummary::default());
        assert_eq!(f.ledger.balance_of(&p("PAX")), amt(dec!(1.2)));
    }

    #[test]
    fn test_zero_premium_policy_resolves_without_credit() {
        let mut f = fixture();
        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), Amount::ZERO, now()).unwrap();

        let summary = f.ledger.credit_payout(f.id).unwrap();
        assert!(summary.credited.is_empty());
        let policy = f.ledger.policy(f.id, &p("PAX")).unwrap();
        assert!(policy.resolved);
        assert!(policy.payout_credit.is_zero());
    }

    #[test]
    fn test_withdraw_zeroes_then_reports_no_balance() {
        let mut f = fixture();
        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), Amount::units(1), now()).unwrap();
        f.ledger.credit_payout(f.id).unwrap();

        let withdrawal = f.ledger.withdraw(&p("PAX")).unwrap();
        assert_eq!(withdrawal.amount, amt(dec!(1.5)));
        assert!(f.ledger.balance_of(&p("PAX")).is_zero());
        assert_eq!(f.ledger.pool(), dec!(9.5));

        assert_eq!(f.ledger.withdraw(&p("PAX")), Err(InsuranceError::NoBalance(p("PAX"))));
    }

    #[test]
    fn test_withdraw_without_policies() {
        let mut f = fixture();
        assert_eq!(f.ledger.withdraw(&p("NOBODY")), Err(InsuranceError::NoBalance(p("NOBODY"))));
    }

    #[test]
    fn test_revert_restores_credit_and_pool() {
        let mut f = fixture();
        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.5)), now()).unwrap();
        f.ledger.credit_payout(f.id).unwrap();
        let pool_before = f.ledger.pool();

        let withdrawal = f.ledger.withdraw(&p("PAX")).unwrap();
        f.ledger.revert_withdrawal(&withdrawal).unwrap();

        assert_eq!(f.ledger.balance_of(&p("PAX")), amt(dec!(0.75)));
        assert_eq!(f.ledger.pool(), pool_before);
    }

    #[test]
    fn test_withdraw_not_limited_by_pool() {
        let registry = OperatorRegistry::with_genesis(RegistryRules::default(), p("AIR"), "Air One");
        let mut catalog = FlightCatalog::new();
        let key = FlightKey::new(p("AIR"), "ND1", now() + chrono::Duration::hours(1));
        let id = catalog.register(&registry, &p("AIR"), key.clone(), now()).unwrap();

        // No operator funding deposited: pool holds only the premium
        let mut ledger = InsuranceLedger::default();
        ledger.purchase(&catalog, &key, &p("PAX"), Amount::units(1), now()).unwrap();
        ledger.credit_payout(id).unwrap();

        let withdrawal = ledger.withdraw(&p("PAX")).unwrap();
        assert_eq!(withdrawal.amount, amt(dec!(1.5)));
        assert_eq!(ledger.pool(), dec!(-0.5));
        assert!(ledger.balance_of(&p("PAX")).is_zero());
    }

    #[test]
    fn test_balance_spans_flights_and_survives_revert() {
        let mut f = fixture();
        let key2 = FlightKey::new(p("AIR"), "ND2", now() + chrono::Duration::hours(8));
        let registry = OperatorRegistry::with_genesis(RegistryRules::default(), p("AIR"), "Air One");
        let id2 = f.catalog.register(&registry, &p("AIR"), key2.clone(), now()).unwrap();

        f.ledger.purchase(&f.catalog, &f.key, &p("PAX"), amt(dec!(0.4)), now()).unwrap();
        f.ledger.purchase(&f.catalog, &key2, &p("PAX"), amt(dec!(0.2)), now()).unwrap();
        f.ledger.credit_payout(f.id).unwrap();
        assert_eq!(f.ledger.balance_of(&p("PAX")), amt(dec!(0.6)));
        f.ledger.credit_payout(id2).unwrap();
        assert_eq!(f.ledger.balance_of(&p("PAX")), amt(dec!(0.9)));

        let withdrawal = f.ledger.withdraw(&p("PAX")).unwrap();
        assert_eq!(withdrawal.amount, amt(dec!(0.9)));
        f.ledger.revert_withdrawal(&withdrawal).unwrap();
        assert_eq!(f.ledger.balance_of(&p("PAX")), amt(dec!(0.9)));
        assert_eq!(f.ledger.policy(id2, &p("PAX")).unwrap().payout_credit, amt(dec!(0.3)));

        // A reverted withdrawal can be taken again in full
        assert_eq!(f.ledger.withdraw(&p("PAX")).unwrap().amount, amt(dec!(0.9)));
    }
}
