//! Protocol constants and application configuration

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::types::{ether, Gwei, Principal};

pub use loader::load_config;

/// Externally visible protocol constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Registered airlines below this count are admitted without a vote.
    pub admission_threshold: usize,
    /// Cumulative funding at which an airline becomes funded.
    pub min_funding: Gwei,
    /// Fee an oracle node pays to register.
    pub oracle_registration_fee: Gwei,
    /// Number of distinct indexes assigned to each oracle node.
    pub index_set_size: usize,
    /// Matching responses needed to finalize a request.
    pub response_quorum: usize,
    /// Indexes are drawn from `[0, index_range)`.
    pub index_range: u16,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            admission_threshold: 4,
            min_funding: ether(10),
            oracle_registration_fee: ether(1),
            index_set_size: 3,
            response_quorum: 3,
            index_range: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Identity allowed to toggle the operational flag.
    pub authority: Principal,
    /// Airline registered at deployment.
    pub founding_airline: Principal,
    pub log_filter: String,
    pub protocol: ProtocolConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            authority: Principal::new("contract-owner"),
            founding_airline: Principal::new("contract-owner"),
            log_filter: "flight_surety=debug".to_string(),
            protocol: ProtocolConfig::default(),
        }
    }
}
