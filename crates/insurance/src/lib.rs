//! FlightSurety Insurance Ledger
//!
//! Escrows passenger premiums per (flight, passenger), credits payouts when a
//! flight is resolved as an airline-caused delay, and pays balances out.
//!
//! # Withdrawal ordering
//! A withdrawal checks the balance, zeroes every credit and only then hands
//! the amount to the `Disbursement` sink. A second withdrawal observes zero.

mod disbursement;
mod error;
mod ledger;
mod policy;

pub use disbursement::{Disbursement, DisbursementError, PayoutLog};
pub use error::InsuranceError;
pub use ledger::{InsuranceLedger, InsuranceTerms, PayoutSummary, Withdrawal};
pub use policy::{Policy, PolicyId};
