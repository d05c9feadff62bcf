//! Oracle Request Coordinator
//!
//! Opens index-tagged requests, collects oracle responses and finalizes a
//! request once `response_quorum` oracles agree on a status.
//!
//! Every request has its own lock. A response is checked, recorded and
//! evaluated for quorum while that lock is held, so a request finalizes
//! exactly once and in submission order.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::directory::OracleDirectory;
use super::index_source::IndexSource;
use super::types::*;
use crate::config::ProtocolConfig;
use crate::error::{FlightSuretyError, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::flights::{FlightCatalog, FlightKey, FlightStatus};
use crate::operational::OperationalGate;
use crate::types::Principal;

pub struct RequestCoordinator {
    requests: DashMap<RequestKey, Arc<Mutex<OracleRequest>>>,
    directory: Arc<OracleDirectory>,
    catalog: Arc<FlightCatalog>,
    index_source: Arc<dyn IndexSource>,
    response_quorum: usize,
    index_range: u16,
    gate: Arc<OperationalGate>,
    events: Arc<EventLog>,
}

impl RequestCoordinator {
    pub fn new(
        config: &ProtocolConfig,
        directory: Arc<OracleDirectory>,
        catalog: Arc<FlightCatalog>,
        index_source: Arc<dyn IndexSource>,
        gate: Arc<OperationalGate>,
        events: Arc<EventLog>,
    ) -> Self {
        Self {
            requests: DashMap::new(),
            directory,
            catalog,
            index_source,
            response_quorum: config.response_quorum,
            index_range: config.index_range,
            gate,
            events,
        }
    }

    /// Open a status request for a cataloged flight.
    ///
    /// The group index is drawn here, not by the caller, so the responding
    /// oracle subset cannot be chosen in advance. Opening a request whose key
    /// already exists returns the existing one untouched.
    pub async fn submit_request(
        &self,
        flight_code: &str,
        owner: &Principal,
        timestamp: u64,
    ) -> Result<OpenedRequest> {
        self.gate.require_operational()?;

        let flight = FlightKey::new(flight_code, owner.clone());
        if !self.catalog.contains(&flight).await {
            warn!("Status requested for unknown flight {} of {}", flight_code, owner);
            return Err(FlightSuretyError::unknown_flight(flight_code, owner));
        }

        let mut context = Vec::with_capacity(flight_code.len() + owner.as_str().len() + 8);
        context.extend_from_slice(owner.as_str().as_bytes());
        context.extend_from_slice(flight_code.as_bytes());
        context.extend_from_slice(&timestamp.to_be_bytes());
        let group_index = self.index_source.draw(&context, self.index_range);

        let key = RequestKey::derive(group_index, &flight, timestamp);
        let request = Arc::new(Mutex::new(OracleRequest::new(
            key,
            flight,
            timestamp,
            group_index,
        )));
        // Held until RequestOpened is logged so no OracleReport can precede it
        let _guard = request.clone().lock_owned().await;

        let inserted = match self.requests.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(request);
                true
            }
        };

        if inserted {
            info!(
                "Opened request {} for flight {} of {} (index {})",
                key, flight_code, owner, group_index
            );
            self.events
                .append(ProtocolEvent::RequestOpened {
                    request_key: key,
                    group_index,
                    flight_code: flight_code.to_string(),
                    owner: owner.clone(),
                    timestamp,
                })
                .await;
        } else {
            debug!("Request {} already exists", key);
        }

        Ok(OpenedRequest { key, group_index })
    }

    /// Record an oracle's answer to an open request.
    pub async fn submit_response(
        &self,
        key: &RequestKey,
        oracle: &Principal,
        status: FlightStatus,
    ) -> Result<ResponseOutcome> {
        self.gate.require_operational()?;

        let request = self
            .requests
            .get(key)
            .map(|r| r.value().clone())
            .ok_or_else(|| FlightSuretyError::UnknownRequest(key.to_string()))?;
        let mut request = request.lock().await;

        let assigned = self
            .directory
            .get_my_indexes(oracle)
            .await
            .map(|indexes| indexes.contains(&request.group_index))
            .unwrap_or(false);
        if !assigned {
            warn!(
                "Oracle {} is not assigned index {} of request {}",
                oracle, request.group_index, key
            );
            return Err(FlightSuretyError::NotEligibleResponder {
                oracle: oracle.clone(),
                group_index: request.group_index,
            });
        }

        if request.has_responded(oracle) {
            warn!("Duplicate response from {} to request {}", oracle, key);
            return Err(FlightSuretyError::DuplicateResponse {
                oracle: oracle.clone(),
                request: key.to_string(),
            });
        }

        if let RequestState::Finalized(final_status) = request.state {
            request.responses.push(OracleResponse {
                oracle: oracle.clone(),
                status,
                counted: false,
            });
            debug!("Late response from {} to finalized request {}", oracle, key);
            self.report(key, oracle, status).await;
            return Ok(ResponseOutcome::AlreadyFinalized(final_status));
        }

        let matching = request.buckets().get(&status).copied().unwrap_or(0) + 1;
        let finalizes = matching >= self.response_quorum;

        // The catalog write is the only step that can fail; do it before
        // touching the request so a failure leaves nothing applied
        if finalizes {
            self.catalog.set_flight_status(&request.flight, status).await?;
        }

        request.responses.push(OracleResponse {
            oracle: oracle.clone(),
            status,
            counted: true,
        });
        self.report(key, oracle, status).await;

        if !finalizes {
            debug!(
                "Request {}: {} of {} responses agree on {}",
                key, matching, self.response_quorum, status
            );
            return Ok(ResponseOutcome::Recorded { matching });
        }

        request.state = RequestState::Finalized(status);
        info!(
            "Request {} finalized with {} for flight {} of {}",
            key, status, request.flight.flight_code, request.flight.owner
        );
        self.events
            .append(ProtocolEvent::RequestFinalized {
                request_key: *key,
                flight_code: request.flight.flight_code.clone(),
                owner: request.flight.owner.clone(),
                status,
            })
            .await;

        Ok(ResponseOutcome::Finalized(status))
    }

    async fn report(&self, key: &RequestKey, oracle: &Principal, status: FlightStatus) {
        self.events
            .append(ProtocolEvent::OracleReport {
                request_key: *key,
                oracle: oracle.clone(),
                status,
            })
            .await;
    }

    /// Snapshot of a request with every response received so far
    pub async fn get_request(&self, key: &RequestKey) -> Option<OracleRequest> {
        let request = self.requests.get(key).map(|r| r.value().clone())?;
        let snapshot = request.lock().await.clone();
        Some(snapshot)
    }

    pub async fn request_state(&self, key: &RequestKey) -> Option<RequestState> {
        self.get_request(key).await.map(|r| r.state)
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn response_quorum(&self) -> usize {
        self.response_quorum
    }
}
