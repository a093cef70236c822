//! Outbound value transfer

use surety_core::{Amount, Principal};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Disbursement to {to} failed: {reason}")]
pub struct DisbursementError {
    pub to: Principal,
    pub reason: String,
}

/// Moves withdrawn value to the passenger. Called only once the cleared
/// credit has been journaled.
pub trait Disbursement: Send {
    fn transfer(&mut self, to: &Principal, amount: Amount) -> Result<(), DisbursementError>;
}

/// In-memory sink that records every transfer
#[derive(Debug, Default, Clone)]
pub struct PayoutLog {
    transfers: Vec<(Principal, Amount)>,
}

impl PayoutLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> &[(Principal, Amount)] {
        &self.transfers
    }
}

impl Disbursement for PayoutLog {
    fn transfer(&mut self, to: &Principal, amount: Amount) -> Result<(), DisbursementError> {
        tracing::info!(to = %to, amount = %amount, "Payout transferred");
        self.transfers.push((to.clone(), amount));
        Ok(())
    }
}
