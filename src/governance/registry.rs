//! Airline Member Registry
//!
//! Handles sponsored registration, funding and the admission transition

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::*;
use crate::config::ProtocolConfig;
use crate::error::{FlightSuretyError, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::operational::OperationalGate;
use crate::types::{Gwei, Principal};

pub struct MemberRegistry {
    members: RwLock<HashMap<Principal, Member>>,
    admission_threshold: usize,
    min_funding: Gwei,
    gate: Arc<OperationalGate>,
    events: Arc<EventLog>,
}

impl MemberRegistry {
    /// Create the registry with the founding airline already Registered.
    /// The founding airline still has to fund before it can sponsor.
    pub fn new(
        config: &ProtocolConfig,
        founding_airline: Principal,
        gate: Arc<OperationalGate>,
        events: Arc<EventLog>,
    ) -> Self {
        let mut founder = Member::new(founding_airline.clone(), RegistrationState::Registered);
        founder.founding = true;

        let mut members = HashMap::new();
        members.insert(founding_airline, founder);

        Self {
            members: RwLock::new(members),
            admission_threshold: config.admission_threshold,
            min_funding: config.min_funding,
            gate,
            events,
        }
    }

    /// Register `candidate` on behalf of `sponsor`.
    ///
    /// Below the admission threshold the candidate is Registered at once;
    /// from the threshold on it waits for a majority vote.
    pub async fn register_member(
        &self,
        candidate: &Principal,
        sponsor: &Principal,
    ) -> Result<Admission> {
        self.gate.require_operational()?;

        let admission = {
            let mut members = self.members.write().await;

            if !members.get(sponsor).is_some_and(Member::is_eligible) {
                warn!("Sponsor {} is not eligible to register {}", sponsor, candidate);
                return Err(FlightSuretyError::SponsorNotEligible(sponsor.clone()));
            }

            if let Some(existing) = members.get(candidate) {
                if existing.registration_state != RegistrationState::Unregistered {
                    debug!(
                        "Candidate {} already {}",
                        candidate,
                        existing.registration_state.as_str()
                    );
                    return Ok(Admission::Unchanged(existing.registration_state));
                }
            }

            let registered = Self::count_registered(&members);
            let state = if registered < self.admission_threshold {
                RegistrationState::Registered
            } else {
                RegistrationState::PendingVote
            };

            members
                .entry(candidate.clone())
                .or_insert_with(|| Member::new(candidate.clone(), state))
                .registration_state = state;

            match state {
                RegistrationState::Registered => Admission::Registered,
                _ => Admission::PendingVote,
            }
        };

        match admission {
            Admission::Registered => {
                info!("Airline {} registered by sponsor {}", candidate, sponsor);
                self.events
                    .append(ProtocolEvent::CandidateAdmitted {
                        candidate: candidate.clone(),
                    })
                    .await;
            }
            _ => {
                info!(
                    "Airline {} sponsored by {} is pending a vote",
                    candidate, sponsor
                );
                self.events
                    .append(ProtocolEvent::CandidatePending {
                        candidate: candidate.clone(),
                        sponsor: sponsor.clone(),
                    })
                    .await;
            }
        }

        Ok(admission)
    }

    /// Add funds to a known member. Funding accumulates.
    pub async fn fund_member(&self, member: &Principal, amount: Gwei) -> Result<AirlineSummary> {
        self.gate.require_operational()?;

        let (summary, funded) = {
            let mut members = self.members.write().await;
            let entry = members
                .get_mut(member)
                .ok_or_else(|| FlightSuretyError::UnknownMember(member.clone()))?;

            let total = entry
                .funded_amount
                .checked_add(amount)
                .ok_or_else(|| FlightSuretyError::FundingOverflow(member.clone()))?;

            entry.funded_amount = total;
            if total >= self.min_funding {
                entry.funded = true;
            }

            (
                AirlineSummary {
                    registration_state: entry.registration_state,
                    funded_amount: entry.funded_amount,
                },
                entry.funded,
            )
        };

        info!(
            "Airline {} funded with {} gwei (total {}, funded: {})",
            member, amount, summary.funded_amount, funded
        );
        self.events
            .append(ProtocolEvent::MemberFunded {
                member: member.clone(),
                funded_amount: summary.funded_amount,
                funded,
            })
            .await;

        Ok(summary)
    }

    /// Compare-and-transition for a pending candidate.
    ///
    /// The electorate is measured under the same lock that performs the
    /// transition, so a candidate is admitted at most once.
    pub(crate) async fn admit_if_majority(
        &self,
        candidate: &Principal,
        approve_count: usize,
    ) -> (VoteTally, bool) {
        let (tally, admitted) = {
            let mut members = self.members.write().await;
            let tally = VoteTally {
                approve_count,
                total_eligible: Self::count_electorate(&members),
            };

            let admitted = match members.get_mut(candidate) {
                Some(member)
                    if member.registration_state == RegistrationState::PendingVote
                        && tally.is_majority() =>
                {
                    member.registration_state = RegistrationState::Registered;
                    true
                }
                _ => false,
            };
            (tally, admitted)
        };

        if admitted {
            info!(
                "Airline {} admitted by vote ({}/{})",
                candidate, tally.approve_count, tally.total_eligible
            );
            self.events
                .append(ProtocolEvent::CandidateAdmitted {
                    candidate: candidate.clone(),
                })
                .await;
        }

        (tally, admitted)
    }

    pub async fn is_airline(&self, member: &Principal) -> bool {
        self.members
            .read()
            .await
            .get(member)
            .is_some_and(|m| m.registration_state == RegistrationState::Registered)
    }

    /// Registered and funded
    pub async fn is_eligible(&self, member: &Principal) -> bool {
        self.members
            .read()
            .await
            .get(member)
            .is_some_and(Member::is_eligible)
    }

    /// Registered, funded and not the founding airline
    pub async fn is_elector(&self, member: &Principal) -> bool {
        self.members
            .read()
            .await
            .get(member)
            .is_some_and(Member::is_elector)
    }

    pub async fn is_known(&self, member: &Principal) -> bool {
        self.members.read().await.contains_key(member)
    }

    /// Registration state and funded amount; unknown ids read as Unregistered
    pub async fn get_airline(&self, member: &Principal) -> AirlineSummary {
        self.members
            .read()
            .await
            .get(member)
            .map(|m| AirlineSummary {
                registration_state: m.registration_state,
                funded_amount: m.funded_amount,
            })
            .unwrap_or(AirlineSummary {
                registration_state: RegistrationState::Unregistered,
                funded_amount: 0,
            })
    }

    pub async fn get_member(&self, member: &Principal) -> Option<Member> {
        self.members.read().await.get(member).cloned()
    }

    /// Registered airlines, excluding the founding airline
    pub async fn get_number_registered_airlines(&self) -> usize {
        Self::count_registered(&*self.members.read().await)
    }

    /// Registered and funded airlines that form the admission electorate
    pub async fn electorate_size(&self) -> usize {
        Self::count_electorate(&*self.members.read().await)
    }

    fn count_registered(members: &HashMap<Principal, Member>) -> usize {
        members
            .values()
            .filter(|m| m.registration_state == RegistrationState::Registered && !m.founding)
            .count()
    }

    fn count_electorate(members: &HashMap<Principal, Member>) -> usize {
        members.values().filter(|m| m.is_elector()).count()
    }
}
