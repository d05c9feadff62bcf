use thiserror::Error;

use crate::types::{Gwei, Principal};

pub type Result<T> = std::result::Result<T, FlightSuretyError>;

impl From<config::ConfigError> for FlightSuretyError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(format!("Failed to load configuration: {}", err))
    }
}

impl From<toml::ser::Error> for FlightSuretyError {
    fn from(err: toml::ser::Error) -> Self {
        Self::ConfigError(format!("Failed to render configuration: {}", err))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlightSuretyError {
    #[error("System is paused: mutating operations are disabled")]
    SystemPaused,

    #[error("Caller {0} is not the operational authority")]
    Unauthorized(Principal),

    #[error("Sponsor {0} is not a registered and funded airline")]
    SponsorNotEligible(Principal),

    #[error("Voter {0} is not a registered and funded airline")]
    VoterNotEligible(Principal),

    #[error("Flight owner {0} is not a registered and funded airline")]
    OwnerNotEligible(Principal),

    #[error("Unknown member: {0}")]
    UnknownMember(Principal),

    #[error("Unknown flight {flight_code} owned by {owner}")]
    UnknownFlight { flight_code: String, owner: Principal },

    #[error("Unknown oracle request: {0}")]
    UnknownRequest(String),

    #[error("{voter} already voted on candidate {candidate}")]
    DuplicateVote {
        voter: Principal,
        candidate: Principal,
    },

    #[error("Oracle {oracle} already responded to request {request}")]
    DuplicateResponse { oracle: Principal, request: String },

    #[error("Oracle {oracle} is not assigned index {group_index}")]
    NotEligibleResponder { oracle: Principal, group_index: u8 },

    #[error("Oracle {0} is not registered")]
    NotRegistered(Principal),

    #[error("Insufficient fee: paid {paid}, required {required}")]
    InsufficientFee { paid: Gwei, required: Gwei },

    #[error("Funding overflow for member {0}")]
    FundingOverflow(Principal),

    #[error("Invalid flight status code: {0}")]
    InvalidStatusCode(u8),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FlightSuretyError {
    pub fn unknown_flight(flight_code: &str, owner: &Principal) -> Self {
        Self::UnknownFlight {
            flight_code: flight_code.to_string(),
            owner: owner.clone(),
        }
    }

    pub fn duplicate_vote(voter: &Principal, candidate: &Principal) -> Self {
        Self::DuplicateVote {
            voter: voter.clone(),
            candidate: candidate.clone(),
        }
    }
}
