//! Status sources for simulated oracle nodes

use rand::seq::SliceRandom;

use crate::flights::{FlightKey, FlightStatus};
use crate::types::Principal;

/// What a simulated oracle node reports for a flight
pub trait StatusOracle: Send + Sync {
    fn status_for(&self, oracle: &Principal, flight: &FlightKey, timestamp: u64) -> FlightStatus;
}

/// Every node reports the same status
pub struct FixedStatus(pub FlightStatus);

impl StatusOracle for FixedStatus {
    fn status_for(&self, _oracle: &Principal, _flight: &FlightKey, _timestamp: u64) -> FlightStatus {
        self.0
    }
}

/// Each node picks a status at random
pub struct RandomStatus {
    choices: Vec<FlightStatus>,
}

impl RandomStatus {
    pub fn new(choices: Vec<FlightStatus>) -> Self {
        Self { choices }
    }
}

impl Default for RandomStatus {
    fn default() -> Self {
        Self::new(vec![
            FlightStatus::Unknown,
            FlightStatus::OnTime,
            FlightStatus::LateAirline,
            FlightStatus::LateWeather,
            FlightStatus::LateTechnical,
            FlightStatus::LateOther,
        ])
    }
}

impl StatusOracle for RandomStatus {
    fn status_for(&self, _oracle: &Principal, _flight: &FlightKey, _timestamp: u64) -> FlightStatus {
        self.choices
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FlightStatus::Unknown)
    }
}
