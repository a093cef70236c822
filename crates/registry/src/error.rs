//! Registry errors

use surety_core::{Amount, Principal};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Operator already applied: {0}")]
    AlreadyApplied(Principal),

    #[error("Operator not found: {0}")]
    NotFound(Principal),

    #[error("Operator is not funded: {0}")]
    NotFunded(Principal),

    #[error("{voter} already voted for {applicant}")]
    DuplicateVote { voter: Principal, applicant: Principal },

    #[error("Operator already registered: {0}")]
    AlreadyRegistered(Principal),

    #[error("Operator is not registered: {0}")]
    NotRegistered(Principal),

    #[error("Operator already funded: {0}")]
    AlreadyFunded(Principal),

    #[error("Insufficient funding: paid {paid}, minimum {minimum}")]
    InsufficientFunding { paid: Amount, minimum: Amount },

    #[error("Operator name cannot be empty")]
    EmptyName,
}
