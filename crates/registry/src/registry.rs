//! Admission state machine

use crate::error::RegistryError;
use crate::operator::{Operator, OperatorState};
use std::collections::HashMap;
use surety_core::{Amount, Principal};

/// Votes needed to admit an applicant when `registered` operators exist.
///
/// `ceil(registered / 2)`, evaluated against the live count on every vote.
pub fn threshold(registered: usize) -> usize {
    registered.div_ceil(2)
}

/// Parameters of the admission and funding rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRules {
    /// Below this many registered operators, a single funded operator admits
    pub bootstrap_size: usize,

    /// Minimum funding payment to move Registered -> Funded
    pub min_funding: Amount,
}

impl Default for RegistryRules {
    fn default() -> Self {
        Self {
            bootstrap_size: 4,
            min_funding: Amount::units(10),
        }
    }
}

/// Result of a successful `admit` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Applicant moved to Registered
    Registered,
    /// Vote counted, quorum not reached yet
    VoteRecorded { votes: usize, threshold: usize },
}

/// Append-only operator table with a principal index
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    rules: RegistryRules,
    operators: Vec<Operator>,
    index: HashMap<Principal, usize>,
}

impl OperatorRegistry {
    /// Create a registry seeded with one funded genesis operator.
    pub fn with_genesis(rules: RegistryRules, genesis: Principal, name: impl Into<String>) -> Self {
        let mut operator = Operator::applied(genesis.clone(), name.into());
        operator.state = OperatorState::Funded;

        let mut index = HashMap::new();
        index.insert(genesis, 0);

        Self {
            rules,
            operators: vec![operator],
            index,
        }
    }

    pub fn rules(&self) -> &RegistryRules {
        &self.rules
    }

    /// Apply for membership
    pub fn apply(&mut self, applicant: Principal, name: &str) -> Result<(), RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&applicant) {
            return Err(RegistryError::AlreadyApplied(applicant));
        }

        tracing::info!(operator = %applicant, name, "Operator applied");
        self.index.insert(applicant.clone(), self.operators.len());
        self.operators.push(Operator::applied(applicant, name.to_string()));
        Ok(())
    }

    /// Admit or vote for an applicant on behalf of a funded operator.
    pub fn admit(&mut self, voter: &Principal, applicant: &Principal) -> Result<AdmissionOutcome, RegistryError> {
        if !self.get(voter).is_some_and(Operator::is_funded) {
            return Err(RegistryError::NotFunded(voter.clone()));
        }

        let registered = self.registered_count();
        let bootstrap = registered < self.rules.bootstrap_size;
        let idx = *self
            .index
            .get(applicant)
            .ok_or_else(|| RegistryError::NotFound(applicant.clone()))?;
        let candidate = &mut self.operators[idx];

        if candidate.state != OperatorState::Applied {
            return Err(RegistryError::AlreadyRegistered(applicant.clone()));
        }

        if bootstrap {
            candidate.state = OperatorState::Registered;
            tracing::info!(operator = %applicant, by = %voter, registered, "Operator admitted during bootstrap");
            return Ok(AdmissionOutcome::Registered);
        }

        if candidate.votes.contains(voter) {
            return Err(RegistryError::DuplicateVote {
                voter: voter.clone(),
                applicant: applicant.clone(),
            });
        }
        candidate.votes.insert(voter.clone());

        let votes = candidate.votes.len();
        let needed = threshold(registered);
        if votes >= needed {
            candidate.state = OperatorState::Registered;
            tracing::info!(operator = %applicant, votes, threshold = needed, "Operator admitted by quorum");
            Ok(AdmissionOutcome::Registered)
        } else {
            tracing::debug!(operator = %applicant, by = %voter, votes, threshold = needed, "Admission vote recorded");
            Ok(AdmissionOutcome::VoteRecorded {
                votes,
                threshold: needed,
            })
        }
    }

    /// Pay funding; Registered -> Funded.
    pub fn fund(&mut self, operator: &Principal, amount: Amount) -> Result<(), RegistryError> {
        let idx = *self
            .index
            .get(operator)
            .ok_or_else(|| RegistryError::NotFound(operator.clone()))?;
        let record = &mut self.operators[idx];

        match record.state {
            OperatorState::Applied => return Err(RegistryError::NotRegistered(operator.clone())),
            OperatorState::Funded => return Err(RegistryError::AlreadyFunded(operator.clone())),
            OperatorState::Registered => {}
        }

        if amount < self.rules.min_funding {
            return Err(RegistryError::InsufficientFunding {
                paid: amount,
                minimum: self.rules.min_funding,
            });
        }

        record.state = OperatorState::Funded;
        record.funding = amount;
        tracing::info!(operator = %operator, funding = %amount, "Operator funded");
        Ok(())
    }

    pub fn state_of(&self, operator: &Principal) -> Result<OperatorState, RegistryError> {
        self.get(operator)
            .map(|o| o.state)
            .ok_or_else(|| RegistryError::NotFound(operator.clone()))
    }

    pub fn get(&self, operator: &Principal) -> Option<&Operator> {
        self.index.get(operator).map(|&idx| &self.operators[idx])
    }

    pub fn is_funded(&self, operator: &Principal) -> bool {
        self.get(operator).is_some_and(Operator::is_funded)
    }

    /// All operators in application order
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// `R`: operators in Registered or Funded state
    pub fn registered_count(&self) -> usize {
        self.operators.iter().filter(|o| o.state.is_member()).count()
    }
}
