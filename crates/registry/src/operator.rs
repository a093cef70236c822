//! Operator record

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumString};
use surety_core::{Amount, Principal};

/// Admission state. Transitions only move forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum OperatorState {
    /// Application received, awaiting admission
    Applied,
    /// Admitted, but no voting rights until funded
    Registered,
    /// Paid the minimum funding; may vote, admit and register flights
    Funded,
}

impl OperatorState {
    /// Numeric code exposed to clients (0 applied, 1 registered, 2 funded)
    pub fn code(&self) -> u8 {
        match self {
            OperatorState::Applied => 0,
            OperatorState::Registered => 1,
            OperatorState::Funded => 2,
        }
    }

    /// Counts toward `R` in the admission rule
    pub fn is_member(&self) -> bool {
        matches!(self, OperatorState::Registered | OperatorState::Funded)
    }
}

/// A federation member or applicant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: Principal,
    pub name: String,
    pub state: OperatorState,
    /// Funded operators that voted to admit this one
    pub votes: BTreeSet<Principal>,
    /// Total funding paid
    pub funding: Amount,
}

impl Operator {
    pub(crate) fn applied(id: Principal, name: String) -> Self {
        Self {
            id,
            name,
            state: OperatorState::Applied,
            votes: BTreeSet::new(),
            funding: Amount::ZERO,
        }
    }

    pub fn is_funded(&self) -> bool {
        self.state == OperatorState::Funded
    }
}
