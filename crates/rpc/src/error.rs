//! Aggregated ledger errors

use strum_macros::{Display, EnumString};
use surety_catalog::CatalogError;
use surety_events::{ChainError, EventError};
use surety_gate::GateError;
use surety_insurance::{DisbursementError, InsuranceError};
use surety_oracle::{OracleError, ResolverError};
use surety_registry::RegistryError;
use thiserror::Error;

/// Errors surfaced by `AppContext` and `LedgerService`
#[derive(Debug, Error)]
pub enum SuretyError {
    #[error("Access denied: {0}")]
    Gate(#[from] GateError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Insurance error: {0}")]
    Insurance(#[from] InsuranceError),

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("{0}")]
    Disbursement(#[from] DisbursementError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Journal error: {0}")]
    Event(#[from] EventError),

    #[error("Journal chain broken: {0}")]
    Chain(#[from] ChainError),

    #[error("Replay failed at sequence {sequence}: {source}")]
    Replay {
        sequence: u64,
        #[source]
        source: Box<SuretyError>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Flat error taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ErrorKind {
    // Gate failures
    NotOperational,
    Unauthorized,
    NotOracle,
    // Domain rule violations
    AlreadyApplied,
    DuplicateVote,
    InsufficientFunding,
    NotFunded,
    DuplicateFlight,
    NotFound,
    UnknownFlight,
    FlightAlreadyDeparted,
    PremiumExceedsMax,
    AlreadyResolved,
    NoBalance,
    AlreadyRegistered,
    NotRegistered,
    AlreadyFunded,
    FlightResolved,
    InvalidStatus,
    InvalidInput,
    DisbursementFailed,
    // Collaborator and persistence failures
    OracleUnavailable,
    Storage,
}

impl SuretyError {
    /// Classify into the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuretyError::Gate(GateError::NotOperational) => ErrorKind::NotOperational,
            SuretyError::Gate(GateError::Unauthorized(_)) => ErrorKind::Unauthorized,
            SuretyError::Registry(e) => registry_kind(e),
            SuretyError::Catalog(e) => catalog_kind(e),
            SuretyError::Insurance(e) => insurance_kind(e),
            SuretyError::Resolver(e) => match e {
                ResolverError::NotOracle(_) => ErrorKind::NotOracle,
                ResolverError::UnknownFlight(_) => ErrorKind::UnknownFlight,
                ResolverError::AlreadyResolved { .. } => ErrorKind::AlreadyResolved,
                ResolverError::InvalidStatus(_) => ErrorKind::InvalidStatus,
                ResolverError::Insurance(e) => insurance_kind(e),
                ResolverError::Catalog(e) => catalog_kind(e),
            },
            SuretyError::Disbursement(_) => ErrorKind::DisbursementFailed,
            SuretyError::Oracle(_) => ErrorKind::OracleUnavailable,
            SuretyError::Event(_) | SuretyError::Chain(_) | SuretyError::Replay { .. } => ErrorKind::Storage,
            SuretyError::Config(_) => ErrorKind::InvalidInput,
        }
    }
}

fn registry_kind(error: &RegistryError) -> ErrorKind {
    match error {
        RegistryError::AlreadyApplied(_) => ErrorKind::AlreadyApplied,
        RegistryError::NotFound(_) => ErrorKind::NotFound,
        RegistryError::NotFunded(_) => ErrorKind::NotFunded,
        RegistryError::DuplicateVote { .. } => ErrorKind::DuplicateVote,
        RegistryError::AlreadyRegistered(_) => ErrorKind::AlreadyRegistered,
        RegistryError::NotRegistered(_) => ErrorKind::NotRegistered,
        RegistryError::AlreadyFunded(_) => ErrorKind::AlreadyFunded,
        RegistryError::InsufficientFunding { .. } => ErrorKind::InsufficientFunding,
        RegistryError::EmptyName => ErrorKind::InvalidInput,
    }
}

fn catalog_kind(error: &CatalogError) -> ErrorKind {
    match error {
        CatalogError::NotFunded(_) => ErrorKind::NotFunded,
        CatalogError::DuplicateFlight(_) => ErrorKind::DuplicateFlight,
        CatalogError::NotFound(_) | CatalogError::NotFoundById(_) => ErrorKind::NotFound,
        CatalogError::EmptyCode => ErrorKind::InvalidInput,
    }
}

fn insurance_kind(error: &InsuranceError) -> ErrorKind {
    match error {
        InsuranceError::UnknownFlight(_) => ErrorKind::UnknownFlight,
        InsuranceError::FlightAlreadyDeparted(_) => ErrorKind::FlightAlreadyDeparted,
        InsuranceError::FlightResolved(_) => ErrorKind::FlightResolved,
        InsuranceError::PremiumExceedsMax { .. } => ErrorKind::PremiumExceedsMax,
        InsuranceError::NoBalance(_) => ErrorKind::NoBalance,
        InsuranceError::UnknownPolicy(_) => ErrorKind::NotFound,
        InsuranceError::Overflow => ErrorKind::InvalidInput,
    }
}
