//! Governance Types and Data Structures

use serde::{Deserialize, Serialize};

use crate::types::{Gwei, Principal};

/// Registration state of an airline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationState {
    Unregistered,
    PendingVote,
    Registered,
}

impl RegistrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationState::Unregistered => "unregistered",
            RegistrationState::PendingVote => "pending_vote",
            RegistrationState::Registered => "registered",
        }
    }
}

/// Governance participant (airline)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Principal,
    pub funded: bool,
    pub funded_amount: Gwei,
    pub registration_state: RegistrationState,
    /// Registered at deployment; sponsors once funded but sits outside the
    /// registered count and the admission electorate, so it does not vote
    pub founding: bool,
}

impl Member {
    pub fn new(id: Principal, registration_state: RegistrationState) -> Self {
        Self {
            id,
            funded: false,
            funded_amount: 0,
            registration_state,
            founding: false,
        }
    }

    /// Registered and funded: may sponsor, vote and own flights
    pub fn is_eligible(&self) -> bool {
        self.registration_state == RegistrationState::Registered && self.funded
    }

    /// Counted in the admission electorate
    pub fn is_elector(&self) -> bool {
        self.is_eligible() && !self.founding
    }
}

/// Public view returned by `get_airline`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineSummary {
    pub registration_state: RegistrationState,
    pub funded_amount: Gwei,
}

/// Outcome of a registration call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// Admitted without a vote
    Registered,
    /// Awaiting majority approval
    PendingVote,
    /// Candidate was already Registered or Pending; nothing changed
    Unchanged(RegistrationState),
}

/// Ballot choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    Approve,
    Reject,
}

impl From<bool> for VoteChoice {
    fn from(approve: bool) -> Self {
        if approve {
            VoteChoice::Approve
        } else {
            VoteChoice::Reject
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: Principal,
    pub candidate: Principal,
    pub choice: VoteChoice,
}

/// Tally of approvals against the current electorate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub approve_count: usize,
    pub total_eligible: usize,
}

impl VoteTally {
    /// At least half of the electorate approves. Ties admit.
    pub fn is_majority(&self) -> bool {
        self.total_eligible > 0 && self.approve_count * 2 >= self.total_eligible
    }
}

/// Result of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub tally: VoteTally,
    /// The candidate moved to Registered as part of this vote
    pub admitted: bool,
}
