//! Application context - wires everything together

use crate::config::SuretyConfig;
use crate::error::SuretyError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use surety_catalog::{Flight, FlightCatalog, FlightId, FlightKey, FlightStatus};
use surety_core::{Amount, Clock, Principal, SystemClock};
use surety_events::{calculate_record_hash, verify_chain, ChainHead, Command, EventReader, EventStore, JournalRecord};
use surety_gate::{AccessGate, Origin};
use surety_insurance::{Disbursement, InsuranceLedger, PayoutLog, Policy, PolicyId, Withdrawal};
use surety_oracle::{Resolution, StatusResolver};
use surety_registry::{AdmissionOutcome, Operator, OperatorRegistry, OperatorState};

/// Everything the journal rebuilds
#[derive(Clone)]
struct LedgerState {
    gate: AccessGate,
    registry: OperatorRegistry,
    catalog: FlightCatalog,
    insurance: InsuranceLedger,
    resolver: StatusResolver,
}

/// Application context - one authoritative copy of ledger state
pub struct AppContext {
    state: LedgerState,
    config: SuretyConfig,
    clock: Arc<dyn Clock>,
    disbursement: Box<dyn Disbursement>,
    journal: Option<EventStore>,
    head: ChainHead,
}

impl AppContext {
    /// Fresh ledger without a journal
    pub fn in_memory(config: SuretyConfig) -> Result<Self, SuretyError> {
        config.validate().map_err(SuretyError::Config)?;

        let mut gate = AccessGate::new(config.controller.clone());
        for gateway in &config.gateways {
            gate.authorize(&config.controller, gateway.clone())?;
        }

        let mut resolver = StatusResolver::new();
        for oracle in &config.oracles {
            resolver.register_oracle(oracle.clone());
        }

        let registry = OperatorRegistry::with_genesis(
            config.registry_rules(),
            config.genesis_operator.clone(),
            config.genesis_name.clone(),
        );

        Ok(Self {
            state: LedgerState {
                gate,
                registry,
                catalog: FlightCatalog::new(),
                insurance: InsuranceLedger::new(config.insurance_terms()),
                resolver,
            },
            config,
            clock: Arc::new(SystemClock),
            disbursement: Box::new(PayoutLog::new()),
            journal: None,
            head: ChainHead::genesis(),
        })
    }

    /// Open the ledger stored under `data_path`, replaying its journal.
    pub fn open(data_path: impl AsRef<Path>, config: SuretyConfig) -> Result<Self, SuretyError> {
        let journal_path = data_path.as_ref().join("journal");
        let mut ctx = Self::in_memory(config)?;

        let records = EventReader::from_directory(&journal_path)?.read_all()?;
        verify_chain(&records)?;

        tracing::info!(records = records.len(), path = %journal_path.display(), "Replaying journal");
        for record in &records {
            ctx.state.replay(record).map_err(|e| SuretyError::Replay {
                sequence: record.sequence,
                source: Box::new(e),
            })?;
            ctx.head = ChainHead::of(record);
        }

        ctx.journal = Some(EventStore::open(&journal_path, ctx.head.clone())?);
        Ok(ctx)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_disbursement(mut self, disbursement: Box<dyn Disbursement>) -> Self {
        self.disbursement = disbursement;
        self
    }

    // === Access gate ===

    pub fn set_operational(&mut self, origin: &Origin, operational: bool) -> Result<(), SuretyError> {
        self.commit(origin, Command::SetOperational { operational }, |state, _| {
            Ok(state.gate.set_operational(&origin.caller, operational)?)
        })
    }

    pub fn authorize(&mut self, origin: &Origin, principal: Principal) -> Result<bool, SuretyError> {
        let command = Command::Authorize {
            principal: principal.clone(),
        };
        self.commit(origin, command, |state, _| Ok(state.gate.authorize(&origin.caller, principal)?))
    }

    pub fn deauthorize(&mut self, origin: &Origin, principal: &Principal) -> Result<bool, SuretyError> {
        let command = Command::Deauthorize {
            principal: principal.clone(),
        };
        self.commit(origin, command, |state, _| Ok(state.gate.deauthorize(&origin.caller, principal)?))
    }

    /// Grant the oracle capability (controller only)
    pub fn register_oracle(&mut self, origin: &Origin, oracle: Principal) -> Result<bool, SuretyError> {
        let command = Command::RegisterOracle { oracle: oracle.clone() };
        self.commit(origin, command, |state, _| state.register_oracle(origin, oracle))
    }

    /// Revoke the oracle capability (controller only)
    pub fn revoke_oracle(&mut self, origin: &Origin, oracle: &Principal) -> Result<bool, SuretyError> {
        let command = Command::RevokeOracle { oracle: oracle.clone() };
        self.commit(origin, command, |state, _| state.revoke_oracle(origin, oracle))
    }

    // === Operator registry ===

    pub fn apply(&mut self, origin: &Origin, name: &str) -> Result<(), SuretyError> {
        let command = Command::Apply { name: name.to_string() };
        self.commit(origin, command, |state, _| state.apply(origin, name))
    }

    /// Admit (bootstrap) or vote for (quorum) an applicant
    pub fn admit(&mut self, origin: &Origin, applicant: &Principal) -> Result<AdmissionOutcome, SuretyError> {
        let command = Command::Admit {
            applicant: applicant.clone(),
        };
        self.commit(origin, command, |state, _| state.admit(origin, applicant))
    }

    pub fn fund(&mut self, origin: &Origin, amount: Amount) -> Result<(), SuretyError> {
        self.commit(origin, Command::Fund { amount }, |state, _| state.fund(origin, amount))
    }

    // === Flight catalog ===

    /// Register a flight operated by the caller
    pub fn register_flight(
        &mut self,
        origin: &Origin,
        code: &str,
        departure: DateTime<Utc>,
    ) -> Result<FlightId, SuretyError> {
        let command = Command::RegisterFlight {
            code: code.to_string(),
            departure,
        };
        self.commit(origin, command, |state, at| {
            state.register_flight(origin, code, departure, at)
        })
    }

    // === Insurance ledger ===

    /// Buy or top up cover on a flight for the caller
    pub fn purchase(&mut self, origin: &Origin, flight: &FlightKey, amount: Amount) -> Result<PolicyId, SuretyError> {
        let command = Command::Purchase {
            flight: flight.clone(),
            amount,
        };
        self.commit(origin, command, |state, at| state.purchase(origin, flight, amount, at))
    }

    /// Pay out the caller's whole balance.
    ///
    /// The withdrawal is journaled before any value moves. A transfer that
    /// fails is journaled as a reversal that restores the credits; if that
    /// reversal cannot be written the credits stay cleared, so a restart
    /// never pays the same balance twice.
    pub fn withdraw(&mut self, origin: &Origin) -> Result<Amount, SuretyError> {
        let withdrawal = self.commit(origin, Command::Withdraw, |state, _| state.withdraw(origin))?;

        if let Err(e) = self.disbursement.transfer(&withdrawal.passenger, withdrawal.amount) {
            let reversal = Command::RevertWithdrawal {
                withdrawal: withdrawal.clone(),
            };
            let reverted = self.commit(origin, reversal, |state, _| {
                Ok(state.insurance.revert_withdrawal(&withdrawal)?)
            });
            if let Err(journal_error) = reverted {
                tracing::error!(
                    passenger = %withdrawal.passenger,
                    amount = %withdrawal.amount,
                    error = %journal_error,
                    "Reversal not journaled; credits stay cleared"
                );
            }
            return Err(e.into());
        }
        Ok(withdrawal.amount)
    }

    // === Status resolver ===

    /// Open an oracle request for an unresolved flight
    pub fn request_status(&mut self, origin: &Origin, flight: &FlightKey) -> Result<bool, SuretyError> {
        let command = Command::RequestStatus { flight: flight.clone() };
        self.commit(origin, command, |state, _| state.request_status(origin, flight))
    }

    /// Oracle verdict for a flight
    pub fn report_status(
        &mut self,
        origin: &Origin,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<Resolution, SuretyError> {
        let command = Command::ReportStatus {
            flight: flight.clone(),
            status,
        };
        self.commit(origin, command, |state, _| state.report_status(origin, flight, status))
    }

    // === Queries (never gated by the operational flag) ===

    pub fn is_operational(&self) -> bool {
        self.state.gate.is_operational()
    }

    pub fn is_authorized(&self, principal: &Principal) -> bool {
        self.state.gate.is_authorized(principal)
    }

    pub fn is_oracle(&self, principal: &Principal) -> bool {
        self.state.resolver.is_oracle(principal)
    }

    pub fn controller(&self) -> &Principal {
        self.state.gate.controller()
    }

    pub fn state_of(&self, operator: &Principal) -> Result<OperatorState, SuretyError> {
        Ok(self.state.registry.state_of(operator)?)
    }

    pub fn operator(&self, operator: &Principal) -> Option<&Operator> {
        self.state.registry.get(operator)
    }

    pub fn operators(&self) -> &[Operator] {
        self.state.registry.operators()
    }

    pub fn registered_count(&self) -> usize {
        self.state.registry.registered_count()
    }

    pub fn list_flights(&self) -> &[Flight] {
        self.state.catalog.list()
    }

    pub fn get_flight(&self, flight: &FlightKey) -> Result<&Flight, SuretyError> {
        Ok(self.state.catalog.get(flight)?)
    }

    pub fn get_flight_by_id(&self, id: FlightId) -> Result<&Flight, SuretyError> {
        Ok(self.state.catalog.get_by_id(id)?)
    }

    pub fn balance_of(&self, passenger: &Principal) -> Amount {
        self.state.insurance.balance_of(passenger)
    }

    pub fn policy(&self, flight: &FlightKey, passenger: &Principal) -> Option<&Policy> {
        let flight = self.state.catalog.lookup(flight)?;
        self.state.insurance.policy(flight.id, passenger)
    }

    pub fn policies_for(&self, flight: &FlightKey) -> Result<Vec<&Policy>, SuretyError> {
        let flight = self.state.catalog.get(flight)?;
        Ok(self.state.insurance.policies_for(flight.id))
    }

    /// Funding + premiums - withdrawals; negative once payouts exceed them
    pub fn pool(&self) -> Decimal {
        self.state.insurance.pool()
    }

    /// Flights with an open oracle request, oldest first
    pub fn pending_requests(&self) -> Vec<&Flight> {
        self.state
            .resolver
            .pending_requests()
            .iter()
            .filter_map(|id| self.state.catalog.get_by_id(*id).ok())
            .collect()
    }

    pub fn oracles(&self) -> Vec<&Principal> {
        self.state.resolver.oracles().collect()
    }

    pub fn gateways(&self) -> Vec<&Principal> {
        self.state.gate.authorized().collect()
    }

    pub fn config(&self) -> &SuretyConfig {
        &self.config
    }

    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_ref().map(EventStore::dir)
    }

    pub fn last_sequence(&self) -> u64 {
        self.head.sequence
    }

    pub fn last_hash(&self) -> &str {
        &self.head.hash
    }

    /// Verify the hash chain of the journal under `data_path` without
    /// replaying it. Returns the number of records checked.
    pub fn audit(data_path: impl AsRef<Path>) -> Result<usize, SuretyError> {
        let records = EventReader::from_directory(data_path.as_ref().join("journal"))?.read_all()?;
        verify_chain(&records)?;
        Ok(records.len())
    }

    /// Run `apply` against a copy of the state, journal `command`, then make
    /// the copy current. A rejected command or a failed append leaves the
    /// context exactly as it was.
    fn commit<T>(
        &mut self,
        origin: &Origin,
        command: Command,
        apply: impl FnOnce(&mut LedgerState, DateTime<Utc>) -> Result<T, SuretyError>,
    ) -> Result<T, SuretyError> {
        let at = self.clock.now();
        let mut staged = self.state.clone();
        let outcome = apply(&mut staged, at)?;
        self.append(origin, command, at)?;
        self.state = staged;
        Ok(outcome)
    }

    fn append(&mut self, origin: &Origin, command: Command, at: DateTime<Utc>) -> Result<(), SuretyError> {
        let mut record = JournalRecord {
            sequence: self.head.sequence + 1,
            prev_hash: self.head.hash.clone(),
            hash: String::new(),
            timestamp: at,
            correlation_id: uuid::Uuid::new_v4().to_string(),
            origin: origin.clone(),
            command,
        };
        record.hash = calculate_record_hash(&record)?;

        if let Some(store) = self.journal.as_mut() {
            if let Err(e) = store.append(&record) {
                tracing::error!(sequence = record.sequence, command = record.command.name(), error = %e, "Journal append failed; command discarded");
                return Err(e.into());
            }
        }

        tracing::debug!(sequence = record.sequence, command = record.command.name(), caller = %origin.caller, "Committed");
        self.head = ChainHead::of(&record);
        Ok(())
    }
}

// === State transitions shared by live calls and replay ===

impl LedgerState {
    fn register_oracle(&mut self, origin: &Origin, oracle: Principal) -> Result<bool, SuretyError> {
        self.gate.require_controller(&origin.caller)?;
        Ok(self.resolver.register_oracle(oracle))
    }

    fn revoke_oracle(&mut self, origin: &Origin, oracle: &Principal) -> Result<bool, SuretyError> {
        self.gate.require_controller(&origin.caller)?;
        Ok(self.resolver.revoke_oracle(oracle))
    }

    fn apply(&mut self, origin: &Origin, name: &str) -> Result<(), SuretyError> {
        self.gate.check(origin)?;
        Ok(self.registry.apply(origin.caller.clone(), name)?)
    }

    fn admit(&mut self, origin: &Origin, applicant: &Principal) -> Result<AdmissionOutcome, SuretyError> {
        self.gate.check(origin)?;
        Ok(self.registry.admit(&origin.caller, applicant)?)
    }

    fn fund(&mut self, origin: &Origin, amount: Amount) -> Result<(), SuretyError> {
        self.gate.check(origin)?;
        self.registry.fund(&origin.caller, amount)?;
        self.insurance.deposit(amount)?;
        Ok(())
    }

    fn register_flight(
        &mut self,
        origin: &Origin,
        code: &str,
        departure: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<FlightId, SuretyError> {
        self.gate.check(origin)?;
        let key = FlightKey::new(origin.caller.clone(), code, departure);
        Ok(self.catalog.register(&self.registry, &origin.caller, key, at)?)
    }

    fn purchase(
        &mut self,
        origin: &Origin,
        flight: &FlightKey,
        amount: Amount,
        at: DateTime<Utc>,
    ) -> Result<PolicyId, SuretyError> {
        self.gate.check(origin)?;
        Ok(self
            .insurance
            .purchase(&self.catalog, flight, &origin.caller, amount, at)?)
    }

    fn withdraw(&mut self, origin: &Origin) -> Result<Withdrawal, SuretyError> {
        self.gate.check(origin)?;
        Ok(self.insurance.withdraw(&origin.caller)?)
    }

    fn request_status(&mut self, origin: &Origin, flight: &FlightKey) -> Result<bool, SuretyError> {
        self.gate.check(origin)?;
        Ok(self.resolver.request_status(&self.catalog, flight)?)
    }

    fn report_status(
        &mut self,
        origin: &Origin,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<Resolution, SuretyError> {
        self.gate.check(origin)?;
        Ok(self.resolver.report(
            &mut self.catalog,
            &mut self.insurance,
            &origin.caller,
            flight,
            status,
        )?)
    }

    /// Re-apply a journaled command at its recorded time. Withdrawals are
    /// not disbursed again.
    fn replay(&mut self, record: &JournalRecord) -> Result<(), SuretyError> {
        let origin = &record.origin;
        let at = record.timestamp;
        match &record.command {
            Command::SetOperational { operational } => self.gate.set_operational(&origin.caller, *operational)?,
            Command::Authorize { principal } => {
                self.gate.authorize(&origin.caller, principal.clone())?;
            }
            Command::Deauthorize { principal } => {
                self.gate.deauthorize(&origin.caller, principal)?;
            }
            Command::RegisterOracle { oracle } => {
                self.register_oracle(origin, oracle.clone())?;
            }
            Command::RevokeOracle { oracle } => {
                self.revoke_oracle(origin, oracle)?;
            }
            Command::Apply { name } => self.apply(origin, name)?,
            Command::Admit { applicant } => {
                self.admit(origin, applicant)?;
            }
            Command::Fund { amount } => self.fund(origin, *amount)?,
            Command::RegisterFlight { code, departure } => {
                self.register_flight(origin, code, *departure, at)?;
            }
            Command::Purchase { flight, amount } => {
                self.purchase(origin, flight, *amount, at)?;
            }
            Command::Withdraw => {
                self.withdraw(origin)?;
            }
            Command::RevertWithdrawal { withdrawal } => self.insurance.revert_withdrawal(withdrawal)?,
            Command::RequestStatus { flight } => {
                self.request_status(origin, flight)?;
            }
            Command::ReportStatus { flight, status } => {
                self.report_status(origin, flight, *status)?;
            }
        }
        Ok(())
    }
}
