//! Access gate errors

use surety_core::Principal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Ledger is not operational")]
    NotOperational,

    #[error("Unauthorized caller: {0}")]
    Unauthorized(Principal),
}
