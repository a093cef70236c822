//! Operational flag and authorized-gateway set

use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use surety_core::Principal;

/// Who delivered a request and on whose behalf.
///
/// `gateway` is the external-facing channel that forwarded the call and is
/// what the authorized set admits. `caller` is the end principal whose
/// rights the registry, catalog, ledger and resolver check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub gateway: Principal,
    pub caller: Principal,
}

impl Origin {
    pub fn new(gateway: Principal, caller: Principal) -> Self {
        Self { gateway, caller }
    }
}

/// Access gate owned by the controller
#[derive(Debug, Clone)]
pub struct AccessGate {
    controller: Principal,
    authorized: BTreeSet<Principal>,
    operational: bool,
}

impl AccessGate {
    /// New gate: operational, nothing authorized yet.
    pub fn new(controller: Principal) -> Self {
        Self {
            controller,
            authorized: BTreeSet::new(),
            operational: true,
        }
    }

    pub fn controller(&self) -> &Principal {
        &self.controller
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn is_authorized(&self, principal: &Principal) -> bool {
        self.authorized.contains(principal)
    }

    /// Authorized gateways in sorted order
    pub fn authorized(&self) -> impl Iterator<Item = &Principal> {
        self.authorized.iter()
    }

    /// Add `principal` to the authorized set.
    ///
    /// Returns false if it was already authorized.
    pub fn authorize(&mut self, caller: &Principal, principal: Principal) -> Result<bool, GateError> {
        self.require_controller(caller)?;
        let added = self.authorized.insert(principal.clone());
        tracing::info!(principal = %principal, added, "Gateway authorized");
        Ok(added)
    }

    /// Remove `principal` from the authorized set.
    ///
    /// Returns false if it was not authorized.
    pub fn deauthorize(&mut self, caller: &Principal, principal: &Principal) -> Result<bool, GateError> {
        self.require_controller(caller)?;
        let removed = self.authorized.remove(principal);
        tracing::info!(principal = %principal, removed, "Gateway deauthorized");
        Ok(removed)
    }

    /// Toggle the operational flag. Allowed while paused.
    pub fn set_operational(&mut self, caller: &Principal, operational: bool) -> Result<(), GateError> {
        self.require_controller(caller)?;
        self.operational = operational;
        tracing::info!(operational, "Operational status changed");
        Ok(())
    }

    /// Precondition of every mutating entry point.
    pub fn check(&self, origin: &Origin) -> Result<(), GateError> {
        if !self.operational {
            tracing::warn!(gateway = %origin.gateway, caller = %origin.caller, "Rejected: not operational");
            return Err(GateError::NotOperational);
        }
        if !self.authorized.contains(&origin.gateway) {
            tracing::warn!(gateway = %origin.gateway, caller = %origin.caller, "Rejected: gateway not authorized");
            return Err(GateError::Unauthorized(origin.gateway.clone()));
        }
        Ok(())
    }

    /// Controller-only administrative calls.
    pub fn require_controller(&self, caller: &Principal) -> Result<(), GateError> {
        if caller != &self.controller {
            tracing::warn!(caller = %caller, "Rejected: not the controller");
            return Err(GateError::Unauthorized(caller.clone()));
        }
        Ok(())
    }
}
