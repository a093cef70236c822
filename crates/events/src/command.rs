//! Journaled commands

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surety_catalog::{FlightKey, FlightStatus};
use surety_core::{Amount, Principal};
use surety_gate::Origin;
use surety_insurance::Withdrawal;

/// A mutating ledger operation as it was requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetOperational { operational: bool },
    Authorize { principal: Principal },
    Deauthorize { principal: Principal },
    RegisterOracle { oracle: Principal },
    RevokeOracle { oracle: Principal },
    Apply { name: String },
    Admit { applicant: Principal },
    Fund { amount: Amount },
    RegisterFlight { code: String, departure: DateTime<Utc> },
    Purchase { flight: FlightKey, amount: Amount },
    Withdraw,
    /// Restores a journaled withdrawal whose transfer failed
    RevertWithdrawal { withdrawal: Withdrawal },
    RequestStatus { flight: FlightKey },
    ReportStatus { flight: FlightKey, status: FlightStatus },
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetOperational { .. } => "set_operational",
            Command::Authorize { .. } => "authorize",
            Command::Deauthorize { .. } => "deauthorize",
            Command::RegisterOracle { .. } => "register_oracle",
            Command::RevokeOracle { .. } => "revoke_oracle",
            Command::Apply { .. } => "apply",
            Command::Admit { .. } => "admit",
            Command::Fund { .. } => "fund",
            Command::RegisterFlight { .. } => "register_flight",
            Command::Purchase { .. } => "purchase",
            Command::Withdraw => "withdraw",
            Command::RevertWithdrawal { .. } => "revert_withdrawal",
            Command::RequestStatus { .. } => "request_status",
            Command::ReportStatus { .. } => "report_status",
        }
    }
}

/// One line of the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub sequence: u64,
    pub prev_hash: String,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: String,
    pub origin: Origin,
    pub command: Command,
}
