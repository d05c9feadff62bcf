//! FlightSurety
//!
//! Wires the protocol components together and exposes every inbound
//! operation behind one handle.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, ProtocolConfig};
use crate::error::Result;
use crate::events::EventLog;
use crate::flights::{Flight, FlightCatalog, FlightStatus};
use crate::governance::{Admission, AirlineSummary, MemberRegistry, VoteReceipt, VoteTally, VotingLedger};
use crate::operational::OperationalGate;
use crate::oracles::{
    HashIndexSource, IndexSource, OpenedRequest, OracleDirectory, OracleRequest, RequestCoordinator,
    RequestKey, ResponseOutcome,
};
use crate::types::{Gwei, Principal};

pub struct FlightSurety {
    protocol: ProtocolConfig,
    events: Arc<EventLog>,
    gate: Arc<OperationalGate>,
    registry: Arc<MemberRegistry>,
    ledger: Arc<VotingLedger>,
    catalog: Arc<FlightCatalog>,
    directory: Arc<OracleDirectory>,
    coordinator: Arc<RequestCoordinator>,
}

impl FlightSurety {
    /// Build a system drawing indexes from a freshly seeded hash source
    pub fn new(config: &AppConfig) -> Self {
        Self::with_index_source(config, Arc::new(HashIndexSource::new()))
    }

    pub fn with_index_source(config: &AppConfig, index_source: Arc<dyn IndexSource>) -> Self {
        let protocol = config.protocol.clone();
        let events = Arc::new(EventLog::new());
        let gate = Arc::new(OperationalGate::new(config.authority.clone(), events.clone()));
        let registry = Arc::new(MemberRegistry::new(
            &protocol,
            config.founding_airline.clone(),
            gate.clone(),
            events.clone(),
        ));
        let ledger = Arc::new(VotingLedger::new(registry.clone(), gate.clone()));
        let catalog = Arc::new(FlightCatalog::new(
            registry.clone(),
            gate.clone(),
            events.clone(),
        ));
        let directory = Arc::new(OracleDirectory::new(
            &protocol,
            index_source.clone(),
            gate.clone(),
            events.clone(),
        ));
        let coordinator = Arc::new(RequestCoordinator::new(
            &protocol,
            directory.clone(),
            catalog.clone(),
            index_source,
            gate.clone(),
            events.clone(),
        ));

        info!(
            "FlightSurety initialized (authority: {}, founding airline: {})",
            config.authority, config.founding_airline
        );

        Self {
            protocol,
            events,
            gate,
            registry,
            ledger,
            catalog,
            directory,
            coordinator,
        }
    }

    // Operational gate

    pub fn is_operational(&self) -> bool {
        self.gate.is_operational()
    }

    pub async fn set_operational(&self, operational: bool, caller: &Principal) -> Result<()> {
        self.gate.set_operational(operational, caller).await
    }

    // Governance

    /// Register an airline; a pending candidate gets an empty ballot
    pub async fn register_member(&self, candidate: &Principal, sponsor: &Principal) -> Result<Admission> {
        let admission = self.registry.register_member(candidate, sponsor).await?;
        if admission == Admission::PendingVote {
            self.ledger.open_ballot(candidate);
        }
        Ok(admission)
    }

    pub async fn fund_member(&self, member: &Principal, amount: Gwei) -> Result<AirlineSummary> {
        self.registry.fund_member(member, amount).await
    }

    pub async fn cast_vote(&self, candidate: &Principal, voter: &Principal, approve: bool) -> Result<VoteReceipt> {
        self.ledger.cast_vote(candidate, voter, approve).await
    }

    pub async fn tally(&self, candidate: &Principal) -> VoteTally {
        self.ledger.tally(candidate).await
    }

    pub async fn is_airline(&self, member: &Principal) -> bool {
        self.registry.is_airline(member).await
    }

    pub async fn get_airline(&self, member: &Principal) -> AirlineSummary {
        self.registry.get_airline(member).await
    }

    pub async fn get_number_registered_airlines(&self) -> usize {
        self.registry.get_number_registered_airlines().await
    }

    // Flights

    pub async fn register_flight(&self, flight_code: &str, timestamp: u64, owner: &Principal) -> Result<Flight> {
        self.catalog.register_flight(flight_code, timestamp, owner).await
    }

    pub async fn get_flight_info(&self, flight_code: &str, owner: &Principal) -> Option<Flight> {
        self.catalog.get_flight_info(flight_code, owner).await
    }

    // Oracles

    pub async fn register_oracle(&self, identity: &Principal, fee_paid: Gwei) -> Result<BTreeSet<u8>> {
        self.directory.register_oracle(identity, fee_paid).await
    }

    pub async fn get_my_indexes(&self, identity: &Principal) -> Result<BTreeSet<u8>> {
        self.directory.get_my_indexes(identity).await
    }

    pub async fn submit_request(&self, flight_code: &str, owner: &Principal, timestamp: u64) -> Result<OpenedRequest> {
        self.coordinator.submit_request(flight_code, owner, timestamp).await
    }

    pub async fn submit_response(
        &self,
        key: &RequestKey,
        oracle: &Principal,
        status: FlightStatus,
    ) -> Result<ResponseOutcome> {
        self.coordinator.submit_response(key, oracle, status).await
    }

    pub async fn get_request(&self, key: &RequestKey) -> Option<OracleRequest> {
        self.coordinator.get_request(key).await
    }

    // Component access

    pub fn protocol(&self) -> &ProtocolConfig {
        &self.protocol
    }

    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }

    pub fn registry(&self) -> &Arc<MemberRegistry> {
        &self.registry
    }

    pub fn ledger(&self) -> &Arc<VotingLedger> {
        &self.ledger
    }

    pub fn catalog(&self) -> &Arc<FlightCatalog> {
        &self.catalog
    }

    pub fn directory(&self) -> &Arc<OracleDirectory> {
        &self.directory
    }

    pub fn coordinator(&self) -> &Arc<RequestCoordinator> {
        &self.coordinator
    }
}
