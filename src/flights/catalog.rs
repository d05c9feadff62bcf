//! Flight Catalog
//!
//! Flights registered by eligible airlines, keyed by (code, owner)

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::types::*;
use crate::error::{FlightSuretyError, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::governance::MemberRegistry;
use crate::operational::OperationalGate;
use crate::types::Principal;

pub struct FlightCatalog {
    flights: RwLock<HashMap<FlightKey, Flight>>,
    registry: Arc<MemberRegistry>,
    gate: Arc<OperationalGate>,
    events: Arc<EventLog>,
}

impl FlightCatalog {
    pub fn new(
        registry: Arc<MemberRegistry>,
        gate: Arc<OperationalGate>,
        events: Arc<EventLog>,
    ) -> Self {
        Self {
            flights: RwLock::new(HashMap::new()),
            registry,
            gate,
            events,
        }
    }

    /// Register a flight, or move the departure of an existing one.
    /// Re-registration keeps the current status.
    pub async fn register_flight(
        &self,
        flight_code: &str,
        departure_timestamp: u64,
        owner: &Principal,
    ) -> Result<Flight> {
        self.gate.require_operational()?;

        if !self.registry.is_eligible(owner).await {
            warn!("Owner {} may not register flight {}", owner, flight_code);
            return Err(FlightSuretyError::OwnerNotEligible(owner.clone()));
        }

        let flight = {
            let mut flights = self.flights.write().await;
            let flight = flights
                .entry(FlightKey::new(flight_code, owner.clone()))
                .and_modify(|f| f.departure_timestamp = departure_timestamp)
                .or_insert_with(|| Flight {
                    flight_code: flight_code.to_string(),
                    owner: owner.clone(),
                    departure_timestamp,
                    status: FlightStatus::Unknown,
                });
            flight.clone()
        };

        info!(
            "Flight {} registered by {} departing at {}",
            flight_code, owner, departure_timestamp
        );
        self.events
            .append(ProtocolEvent::FlightRegistered {
                flight_code: flight_code.to_string(),
                owner: owner.clone(),
                departure_timestamp,
            })
            .await;

        Ok(flight)
    }

    pub async fn get_flight_info(&self, flight_code: &str, owner: &Principal) -> Option<Flight> {
        self.flights
            .read()
            .await
            .get(&FlightKey::new(flight_code, owner.clone()))
            .cloned()
    }

    pub async fn contains(&self, key: &FlightKey) -> bool {
        self.flights.read().await.contains_key(key)
    }

    /// Flights owned by an airline, sorted by departure
    pub async fn flights_of(&self, owner: &Principal) -> Vec<Flight> {
        let mut flights: Vec<Flight> = self
            .flights
            .read()
            .await
            .values()
            .filter(|f| &f.owner == owner)
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.departure_timestamp);
        flights
    }

    /// Written by the request coordinator when a request finalizes
    pub(crate) async fn set_flight_status(&self, key: &FlightKey, status: FlightStatus) -> Result<()> {
        let mut flights = self.flights.write().await;
        let flight = flights
            .get_mut(key)
            .ok_or_else(|| FlightSuretyError::unknown_flight(&key.flight_code, &key.owner))?;
        flight.status = status;
        info!("Flight {} of {} status set to {}", key.flight_code, key.owner, status);
        Ok(())
    }
}
