//! Insurance policy record

use serde::{Deserialize, Serialize};
use surety_catalog::FlightId;
use surety_core::{Amount, Principal};

/// Stable index into the policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyId(pub usize);

/// One passenger's cover on one flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub flight: FlightId,
    pub passenger: Principal,
    /// Escrowed premium, capped by the ledger's maximum
    pub premium: Amount,
    /// Withdrawable credit; zero until resolved, zero again once withdrawn
    pub payout_credit: Amount,
    /// Set once the flight's outcome has been applied to this policy
    pub resolved: bool,
}
