//! Flight Types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FlightSuretyError;
use crate::types::Principal;

/// Flight status as reported by oracle nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Numeric code used on the wire by oracle nodes
    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Unknown => "unknown",
            FlightStatus::OnTime => "on_time",
            FlightStatus::LateAirline => "late_airline",
            FlightStatus::LateWeather => "late_weather",
            FlightStatus::LateTechnical => "late_technical",
            FlightStatus::LateOther => "late_other",
        }
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = FlightSuretyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FlightStatus::Unknown),
            10 => Ok(FlightStatus::OnTime),
            20 => Ok(FlightStatus::LateAirline),
            30 => Ok(FlightStatus::LateWeather),
            40 => Ok(FlightStatus::LateTechnical),
            50 => Ok(FlightStatus::LateOther),
            other => Err(FlightSuretyError::InvalidStatusCode(other)),
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

/// A flight is identified by its code together with the owning airline.
/// Two airlines may register the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub flight_code: String,
    pub owner: Principal,
}

impl FlightKey {
    pub fn new(flight_code: impl Into<String>, owner: Principal) -> Self {
        Self {
            flight_code: flight_code.into(),
            owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_code: String,
    pub owner: Principal,
    /// Scheduled departure, unix seconds
    pub departure_timestamp: u64,
    pub status: FlightStatus,
}
