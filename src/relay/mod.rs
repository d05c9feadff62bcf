//! Oracle Relay
//!
//! Plays the off-ledger oracle server: registers a batch of simulated
//! oracle nodes, follows the event log from its own cursor and answers each
//! `RequestOpened` with every node assigned the request's group index.

pub mod status;

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::events::{EventRecord, ProtocolEvent};
use crate::flights::{FlightKey, FlightStatus};
use crate::oracles::{RequestKey, ResponseOutcome};
use crate::system::FlightSurety;
use crate::types::Principal;

pub use status::{FixedStatus, RandomStatus, StatusOracle};

#[derive(Debug, Clone, Serialize)]
pub struct SimulatedOracle {
    pub identity: Principal,
    pub indexes: BTreeSet<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizedRequest {
    pub request_key: RequestKey,
    pub flight_code: String,
    pub owner: Principal,
    pub status: FlightStatus,
}

/// What the relay observed and did
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelayReport {
    pub requests_seen: usize,
    pub responses_submitted: usize,
    /// Accepted after the request had already finalized
    pub late_responses: usize,
    pub rejected: usize,
    pub finalized: Vec<FinalizedRequest>,
}

impl RelayReport {
    pub fn merge(&mut self, other: RelayReport) {
        self.requests_seen += other.requests_seen;
        self.responses_submitted += other.responses_submitted;
        self.late_responses += other.late_responses;
        self.rejected += other.rejected;
        self.finalized.extend(other.finalized);
    }
}

pub struct OracleRelay {
    session: Uuid,
    system: Arc<FlightSurety>,
    nodes: Vec<SimulatedOracle>,
    status: Arc<dyn StatusOracle>,
    cursor: u64,
}

impl OracleRelay {
    /// Register `count` oracle nodes, each paying the registration fee
    pub async fn register(
        system: Arc<FlightSurety>,
        count: usize,
        status: Arc<dyn StatusOracle>,
    ) -> Result<Self> {
        let session = Uuid::new_v4();
        let fee = system.protocol().oracle_registration_fee;

        let mut nodes = Vec::with_capacity(count);
        for i in 0..count {
            let identity = Principal::new(format!("oracle-{:02}", i));
            let indexes = system.register_oracle(&identity, fee).await?;
            nodes.push(SimulatedOracle { identity, indexes });
        }

        info!("Relay {} registered {} oracle nodes", session, nodes.len());
        Ok(Self {
            session,
            system,
            nodes,
            status,
            cursor: 0,
        })
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn nodes(&self) -> &[SimulatedOracle] {
        &self.nodes
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Handle every event appended since the last poll
    pub async fn poll_once(&mut self) -> RelayReport {
        let records = self.system.events().events_since(self.cursor).await;
        self.handle(records).await
    }

    /// Poll until the log stops growing
    pub async fn drain(&mut self) -> RelayReport {
        let mut total = RelayReport::default();
        loop {
            let records = self.system.events().events_since(self.cursor).await;
            if records.is_empty() {
                return total;
            }
            total.merge(self.handle(records).await);
        }
    }

    /// Follow the log until `shutdown` flips or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> RelayReport {
        let mut total = RelayReport::default();
        let events = self.system.events().clone();
        let span = info_span!("relay", session = %self.session);

        async {
            loop {
                let records = tokio::select! {
                    records = events.wait_for_events(self.cursor) => records,
                    _ = shutdown.changed() => break,
                };
                total.merge(self.handle(records).await);
            }
            info!("Relay stopped at cursor {}", self.cursor);
        }
        .instrument(span)
        .await;

        total
    }

    async fn handle(&mut self, records: Vec<EventRecord>) -> RelayReport {
        let mut report = RelayReport::default();

        for record in records {
            // Each record is handled once; the cursor never moves back
            if record.sequence < self.cursor {
                continue;
            }
            self.cursor = record.sequence + 1;

            match record.event {
                ProtocolEvent::RequestOpened {
                    request_key,
                    group_index,
                    flight_code,
                    owner,
                    timestamp,
                } => {
                    report.requests_seen += 1;
                    let flight = FlightKey::new(flight_code, owner);
                    self.answer(request_key, group_index, &flight, timestamp, &mut report)
                        .await;
                }
                ProtocolEvent::RequestFinalized {
                    request_key,
                    flight_code,
                    owner,
                    status,
                } => {
                    report.finalized.push(FinalizedRequest {
                        request_key,
                        flight_code,
                        owner,
                        status,
                    });
                }
                _ => {}
            }
        }

        report
    }

    /// Submit one response per assigned node, concurrently
    async fn answer(
        &self,
        key: RequestKey,
        group_index: u8,
        flight: &FlightKey,
        timestamp: u64,
        report: &mut RelayReport,
    ) {
        let mut tasks = JoinSet::new();
        for node in self.nodes.iter().filter(|n| n.indexes.contains(&group_index)) {
            let system = self.system.clone();
            let identity = node.identity.clone();
            let status = self.status.status_for(&identity, flight, timestamp);
            tasks.spawn(async move { system.submit_response(&key, &identity, status).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(ResponseOutcome::AlreadyFinalized(_))) => report.late_responses += 1,
                Ok(Ok(_)) => report.responses_submitted += 1,
                Ok(Err(e)) => {
                    warn!("Oracle response to {} rejected: {}", key, e);
                    report.rejected += 1;
                }
                Err(e) => {
                    error!("Oracle response task failed: {}", e);
                    report.rejected += 1;
                }
            }
        }
    }
}
