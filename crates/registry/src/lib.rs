//! # FlightSurety Operator Registry
//!
//! Airline admission state machine: `Applied -> Registered -> Funded`.
//!
//! ## Admission
//! - While fewer than `bootstrap_size` operators are registered, any funded
//!   operator admits an applicant on its own.
//! - Afterwards an applicant needs `ceil(R/2)` votes from funded operators,
//!   where `R` is the live registered count at the time of each vote.
//!
//! ## Funding
//! A registered operator becomes funded once it pays at least the minimum.
//! Excess is kept, never refunded.

mod error;
mod operator;
mod registry;

pub use error::RegistryError;
pub use operator::{Operator, OperatorState};
pub use registry::{threshold, AdmissionOutcome, OperatorRegistry, RegistryRules};
