//! Admission Voting Ledger
//!
//! One vote per (voter, candidate). Votes for the same candidate are
//! serialized by a per-candidate lock; different candidates proceed in
//! parallel.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::registry::MemberRegistry;
use super::types::*;
use crate::error::{FlightSuretyError, Result};
use crate::operational::OperationalGate;
use crate::types::Principal;

#[derive(Debug, Default)]
struct Ballot {
    votes: HashMap<Principal, VoteChoice>,
    /// Voting order, for audit reads
    order: Vec<Principal>,
}

impl Ballot {
    fn approvals(&self) -> usize {
        self.votes
            .values()
            .filter(|c| **c == VoteChoice::Approve)
            .count()
    }
}

pub struct VotingLedger {
    ballots: DashMap<Principal, Arc<Mutex<Ballot>>>,
    registry: Arc<MemberRegistry>,
    gate: Arc<OperationalGate>,
}

impl VotingLedger {
    pub fn new(registry: Arc<MemberRegistry>, gate: Arc<OperationalGate>) -> Self {
        Self {
            ballots: DashMap::new(),
            registry,
            gate,
        }
    }

    /// Open an empty ballot for a pending candidate. Idempotent.
    pub fn open_ballot(&self, candidate: &Principal) {
        self.ballot(candidate);
    }

    pub fn open_ballots(&self) -> usize {
        self.ballots.len()
    }

    fn ballot(&self, candidate: &Principal) -> Arc<Mutex<Ballot>> {
        self.ballots
            .entry(candidate.clone())
            .or_default()
            .value()
            .clone()
    }

    /// Record a vote and admit the candidate if it now holds a majority.
    pub async fn cast_vote(
        &self,
        candidate: &Principal,
        voter: &Principal,
        approve: bool,
    ) -> Result<VoteReceipt> {
        self.gate.require_operational()?;

        // Only the electorate votes, so approvals never exceed it
        if !self.registry.is_elector(voter).await {
            warn!("Voter {} is not eligible", voter);
            return Err(FlightSuretyError::VoterNotEligible(voter.clone()));
        }
        if !self.registry.is_known(candidate).await {
            return Err(FlightSuretyError::UnknownMember(candidate.clone()));
        }

        let ballot = self.ballot(candidate);
        let mut ballot = ballot.lock().await;

        if ballot.votes.contains_key(voter) {
            warn!("Duplicate vote by {} on {}", voter, candidate);
            return Err(FlightSuretyError::duplicate_vote(voter, candidate));
        }

        let choice = VoteChoice::from(approve);
        ballot.votes.insert(voter.clone(), choice);
        ballot.order.push(voter.clone());
        info!("{} voted {:?} on candidate {}", voter, choice, candidate);

        // Ballot lock stays held so the next vote on this candidate sees the
        // outcome of this one
        let (tally, admitted) = self
            .registry
            .admit_if_majority(candidate, ballot.approvals())
            .await;

        Ok(VoteReceipt { tally, admitted })
    }

    /// Approvals against the current electorate
    pub async fn tally(&self, candidate: &Principal) -> VoteTally {
        let approve_count = match self.ballots.get(candidate).map(|b| b.value().clone()) {
            Some(ballot) => ballot.lock().await.approvals(),
            None => 0,
        };
        VoteTally {
            approve_count,
            total_eligible: self.registry.electorate_size().await,
        }
    }

    /// Votes on a candidate in the order they were cast
    pub async fn votes(&self, candidate: &Principal) -> Vec<Vote> {
        let Some(ballot) = self.ballots.get(candidate).map(|b| b.value().clone()) else {
            return Vec::new();
        };
        let ballot = ballot.lock().await;
        ballot
            .order
            .iter()
            .filter_map(|voter| {
                ballot.votes.get(voter).map(|choice| Vote {
                    voter: voter.clone(),
                    candidate: candidate.clone(),
                    choice: *choice,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProtocolConfig;
    use crate::events::EventLog;
    use crate::types::ether;

    async fn setup(electors: usize) -> (VotingLedger, Arc<MemberRegistry>, Vec<Principal>) {
        let events = Arc::new(EventLog::new());
        let owner = Principal::from("owner");
        let gate = Arc::new(OperationalGate::new(owner.clone(), events.clone()));
        let config = ProtocolConfig {
            admission_threshold: electors,
            ..ProtocolConfig::default()
        };
        let registry = Arc::new(MemberRegistry::new(
            &config,
            owner.clone(),
            gate.clone(),
            events,
        ));
        registry.fund_member(&owner, ether(10)).await.unwrap();

        let mut airlines = Vec::new();
        for i in 0..electors {
            let airline = Principal::from(format!("airline-{}", i));
            registry.register_member(&airline, &owner).await.unwrap();
            registry.fund_member(&airline, ether(10)).await.unwrap();
            airlines.push(airline);
        }
        (VotingLedger::new(registry.clone(), gate), registry, airlines)
    }

    #[tokio::test]
    async fn test_one_of_two_admits() {
        let (ledger, registry, airlines) = setup(2).await;
        let candidate = Principal::from("candidate");
        registry
            .register_member(&candidate, &Principal::from("owner"))
            .await
            .unwrap();

        let receipt = ledger.cast_vote(&candidate, &airlines[0], true).await.unwrap();
        assert!(receipt.admitted);
        assert_eq!(receipt.tally.approve_count, 1);
        assert_eq!(receipt.tally.total_eligible, 2);
        assert!(registry.is_airline(&candidate).await);
    }

    #[tokio::test]
    async fn test_one_of_three_does_not_admit() {
        let (ledger, registry, airlines) = setup(3).await;
        let candidate = Principal::from("candidate");
        registry
            .register_member(&candidate, &Principal::from("owner"))
            .await
            .unwrap();

        let receipt = ledger.cast_vote(&candidate, &airlines[0], true).await.unwrap();
        assert!(!receipt.admitted);
        assert!(!registry.is_airline(&candidate).await);
    }

    #[tokio::test]
    async fn test_revote_with_other_choice_is_duplicate() {
        let (ledger, registry, airlines) = setup(4).await;
        let candidate = Principal::from("candidate");
        registry
            .register_member(&candidate, &Principal::from("owner"))
            .await
            .unwrap();

        ledger.cast_vote(&candidate, &airlines[0], true).await.unwrap();
        let result = ledger.cast_vote(&candidate, &airlines[0], false).await;
        assert_eq!(
            result,
            Err(FlightSuretyError::duplicate_vote(&airlines[0], &candidate))
        );

        let tally = ledger.tally(&candidate).await;
        assert_eq!(tally.approve_count, 1);
        let votes = ledger.votes(&candidate).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].choice, VoteChoice::Approve);
    }

    #[tokio::test]
    async fn test_reject_votes_do_not_count() {
        let (ledger, registry, airlines) = setup(2).await;
        let candidate = Principal::from("candidate");
        registry
            .register_member(&candidate, &Principal::from("owner"))
            .await
            .unwrap();

        let receipt = ledger.cast_vote(&candidate, &airlines[0], false).await.unwrap();
        assert!(!receipt.admitted);
        assert_eq!(receipt.tally.approve_count, 0);
    }

    #[tokio::test]
    async fn test_founding_airline_cannot_vote() {
        let (ledger, registry, _) = setup(2).await;
        let owner = Principal::from("owner");
        let candidate = Principal::from("candidate");
        registry.register_member(&candidate, &owner).await.unwrap();

        assert_eq!(
            ledger.cast_vote(&candidate, &owner, true).await,
            Err(FlightSuretyError::VoterNotEligible(owner))
        );
        assert_eq!(ledger.tally(&candidate).await.approve_count, 0);
    }

    #[tokio::test]
    async fn test_ineligible_voter_and_unknown_candidate() {
        let (ledger, _, airlines) = setup(2).await;
        let outsider = Principal::from("outsider");
        let candidate = Principal::from("nobody");

        assert_eq!(
            ledger.cast_vote(&airlines[0].clone(), &outsider, true).await,
            Err(FlightSuretyError::VoterNotEligible(outsider))
        );
        assert_eq!(
            ledger.cast_vote(&candidate, &airlines[0], true).await,
            Err(FlightSuretyError::UnknownMember(candidate))
        );
    }
}
