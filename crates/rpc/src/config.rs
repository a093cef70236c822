//! Ledger configuration
//!
//! Underwriting and admission constants are configurable via a JSON file;
//! omitted fields fall back to the defaults below.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surety_core::{Amount, Principal};
use surety_insurance::InsuranceTerms;
use surety_registry::RegistryRules;

/// Configuration for an `AppContext`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuretyConfig {
    // === Identities ===
    /// Owner of the access gate
    #[serde(default = "default_controller")]
    pub controller: Principal,

    /// Operator seeded as Funded, so the registry starts with R = 1
    #[serde(default = "default_controller")]
    pub genesis_operator: Principal,

    #[serde(default = "default_genesis_name")]
    pub genesis_name: String,

    /// Gateways authorized at startup
    #[serde(default = "default_gateways")]
    pub gateways: Vec<Principal>,

    /// Oracles registered at startup
    #[serde(default)]
    pub oracles: Vec<Principal>,

    // === Underwriting ===
    /// Cap on cumulative premium per (flight, passenger)
    #[serde(default = "default_max_premium")]
    pub max_premium: Amount,

    /// Credit = premium * multiplier on an airline delay
    #[serde(default = "default_payout_multiplier")]
    pub payout_multiplier: Decimal,

    // === Admission ===
    /// Minimum funding payment for voting rights
    #[serde(default = "default_min_funding")]
    pub min_funding: Amount,

    /// Registered count below which a single funded operator admits
    #[serde(default = "default_bootstrap_size")]
    pub bootstrap_size: usize,
}

fn default_controller() -> Principal {
    Principal::new_unchecked("OWNER")
}

fn default_genesis_name() -> String {
    "Genesis Airline".to_string()
}

fn default_gateways() -> Vec<Principal> {
    vec![Principal::new_unchecked("APP")]
}

fn default_max_premium() -> Amount {
    Amount::units(1)
}

fn default_payout_multiplier() -> Decimal {
    Decimal::new(15, 1) // 1.5
}

fn default_min_funding() -> Amount {
    Amount::units(10)
}

fn default_bootstrap_size() -> usize {
    4
}

impl Default for SuretyConfig {
    fn default() -> Self {
        Self {
            controller: default_controller(),
            genesis_operator: default_controller(),
            genesis_name: default_genesis_name(),
            gateways: default_gateways(),
            oracles: Vec::new(),
            max_premium: default_max_premium(),
            payout_multiplier: default_payout_multiplier(),
            min_funding: default_min_funding(),
            bootstrap_size: default_bootstrap_size(),
        }
    }
}

impl SuretyConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Reject values the ledger cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.payout_multiplier < Decimal::ZERO {
            return Err(format!("payout_multiplier must be >= 0, got {}", self.payout_multiplier));
        }
        if self.genesis_name.trim().is_empty() {
            return Err("genesis_name cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn registry_rules(&self) -> RegistryRules {
        RegistryRules {
            bootstrap_size: self.bootstrap_size,
            min_funding: self.min_funding,
        }
    }

    pub fn insurance_terms(&self) -> InsuranceTerms {
        InsuranceTerms {
            max_premium: self.max_premium,
            payout_multiplier: self.payout_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = SuretyConfig::default();

        assert_eq!(config.controller.as_str(), "OWNER");
        assert_eq!(config.genesis_operator, config.controller);
        assert_eq!(config.gateways, vec![Principal::new("APP").unwrap()]);
        assert!(config.oracles.is_empty());
        assert_eq!(config.max_premium, Amount::units(1));
        assert_eq!(config.payout_multiplier, dec!(1.5));
        assert_eq!(config.min_funding, Amount::units(10));
        assert_eq!(config.bootstrap_size, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{ "max_premium": "2", "oracles": ["ORACLE1"] }"#;
        let config: SuretyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.max_premium, Amount::units(2));
        assert_eq!(config.oracles, vec![Principal::new("ORACLE1").unwrap()]);
        assert_eq!(config.min_funding, Amount::units(10)); // default
    }

    #[test]
    fn test_config_rejects_invalid_principal() {
        let json = r#"{ "controller": "" }"#;
        assert!(serde_json::from_str::<SuretyConfig>(json).is_err());
    }

    #[test]
    fn test_validate_negative_multiplier() {
        let config = SuretyConfig {
            payout_multiplier: dec!(-1),
            ..SuretyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_rules() {
        let config = SuretyConfig::default();
        assert_eq!(config.registry_rules(), RegistryRules::default());
        assert_eq!(config.insurance_terms(), InsuranceTerms::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("surety.json");
        std::fs::write(&path, r#"{ "bootstrap_size": 2 }"#).unwrap();

        let config = SuretyConfig::from_file(&path).unwrap();
        assert_eq!(config.bootstrap_size, 2);

        std::fs::write(&path, "not json").unwrap();
        let err = SuretyConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
