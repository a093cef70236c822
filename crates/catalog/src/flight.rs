//! Flight identity and status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};
use surety_core::Principal;

/// Natural identity of a flight
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Principal,
    pub code: String,
    pub departure: DateTime<Utc>,
}

impl FlightKey {
    pub fn new(airline: Principal, code: impl Into<String>, departure: DateTime<Utc>) -> Self {
        Self {
            airline,
            code: code.into().trim().to_uppercase(),
            departure,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.code, self.departure.to_rfc3339())
    }
}

/// Stable index into the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightId(pub usize);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flight outcome as reported by the oracle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Unknown,
    OnTime,
    AirlineDelay,
    WeatherDelay,
    TechnicalDelay,
    OtherDelay,
}

impl FlightStatus {
    /// Wire code used by status reporters
    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::AirlineDelay => 20,
            FlightStatus::WeatherDelay => 30,
            FlightStatus::TechnicalDelay => 40,
            FlightStatus::OtherDelay => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::AirlineDelay),
            30 => Some(FlightStatus::WeatherDelay),
            40 => Some(FlightStatus::TechnicalDelay),
            50 => Some(FlightStatus::OtherDelay),
            _ => None,
        }
    }

    /// Only airline-caused delay pays out
    pub fn is_compensable(&self) -> bool {
        *self == FlightStatus::AirlineDelay
    }
}

/// A registered flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    pub key: FlightKey,
    pub status: FlightStatus,
    pub registered_at: DateTime<Utc>,
}

impl Flight {
    pub fn is_resolved(&self) -> bool {
        self.status != FlightStatus::Unknown
    }

    /// Purchases close once `now` passes departure
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        now > self.key.departure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in FlightStatus::iter() {
            assert_eq!(FlightStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FlightStatus::from_code(15), None);
    }

    #[test]
    fn test_only_airline_delay_compensable() {
        let compensable: Vec<_> = FlightStatus::iter().filter(|s| s.is_compensable()).collect();
        assert_eq!(compensable, vec![FlightStatus::AirlineDelay]);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("airline_delay".parse::<FlightStatus>().unwrap(), FlightStatus::AirlineDelay);
        assert_eq!("ON_TIME".parse::<FlightStatus>().unwrap(), FlightStatus::OnTime);
        assert_eq!(FlightStatus::WeatherDelay.to_string(), "weather_delay");
    }

    #[test]
    fn test_key_normalizes_code() {
        let departure = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let key = FlightKey::new(Principal::new("AIR").unwrap(), " nd1309 ", departure);
        assert_eq!(key.code, "ND1309");
        assert_eq!(key.to_string(), "AIR/ND1309@2024-06-01T08:30:00+00:00");
    }

    #[test]
    fn test_key_serde() {
        let departure = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let key = FlightKey::new(Principal::new("AIR").unwrap(), "ND1309", departure);
        let json = serde_json::to_string(&key).unwrap();
        assert!(json.contains("\"airline\":\"AIR\""));
        let parsed: FlightKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
