#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use flight_surety::config::{AppConfig, ProtocolConfig};
use flight_surety::governance::Admission;
use flight_surety::oracles::IndexSource;
use flight_surety::{ether, FlightSurety, Principal};

pub const FOUNDER: &str = "contract-owner";

/// Index source that replays a fixed script, then returns 0
pub struct ScriptedIndexSource {
    script: Mutex<VecDeque<u8>>,
}

impl ScriptedIndexSource {
    pub fn new(script: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    pub fn push(&self, value: u8) {
        self.script.lock().unwrap().push_back(value);
    }
}

impl IndexSource for ScriptedIndexSource {
    fn draw(&self, _context: &[u8], range: u16) -> u8 {
        let value = self.script.lock().unwrap().pop_front().unwrap_or(0);
        assert!(u16::from(value) < range, "scripted index {} out of range", value);
        value
    }
}

pub fn founder() -> Principal {
    Principal::from(FOUNDER)
}

pub fn airline(i: usize) -> Principal {
    Principal::new(format!("airline-{}", i))
}

pub fn oracle(i: usize) -> Principal {
    Principal::new(format!("oracle-{}", i))
}

pub fn test_config() -> AppConfig {
    AppConfig {
        authority: founder(),
        founding_airline: founder(),
        protocol: ProtocolConfig::default(),
        ..AppConfig::default()
    }
}

/// System with a seeded hash index source
pub fn setup_system() -> FlightSurety {
    FlightSurety::new(&test_config())
}

pub fn setup_scripted_system(script: impl IntoIterator<Item = u8>) -> (FlightSurety, Arc<ScriptedIndexSource>) {
    let source = Arc::new(ScriptedIndexSource::new(script));
    let system = FlightSurety::with_index_source(&test_config(), source.clone());
    (system, source)
}

/// Fund the founder, then register and fund airlines 1..=count through it.
/// Candidates past the threshold are voted in by the airlines before them.
pub async fn setup_funded_airlines(system: &FlightSurety, count: usize) -> Vec<Principal> {
    system
        .fund_member(&founder(), ether(10))
        .await
        .expect("Failed to fund founder");

    let mut airlines: Vec<Principal> = Vec::new();
    for i in 1..=count {
        let candidate = airline(i);
        let admission = system
            .register_member(&candidate, &founder())
            .await
            .expect("Failed to register airline");
        if admission == Admission::PendingVote {
            for voter in &airlines {
                let receipt = system
                    .cast_vote(&candidate, voter, true)
                    .await
                    .expect("Failed to vote");
                if receipt.admitted {
                    break;
                }
            }
        }
        assert!(system.is_airline(&candidate).await);
        system
            .fund_member(&candidate, ether(10))
            .await
            .expect("Failed to fund airline");
        airlines.push(candidate);
    }
    airlines
}
