//! Oracle Directory
//!
//! Registers oracle nodes and assigns each a fixed set of indexes

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::index_source::{draw_index_set, IndexSource};
use super::types::OracleNode;
use crate::config::ProtocolConfig;
use crate::error::{FlightSuretyError, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::operational::OperationalGate;
use crate::types::{Gwei, Principal};

pub struct OracleDirectory {
    oracles: RwLock<HashMap<Principal, OracleNode>>,
    index_source: Arc<dyn IndexSource>,
    registration_fee: Gwei,
    index_set_size: usize,
    index_range: u16,
    gate: Arc<OperationalGate>,
    events: Arc<EventLog>,
}

impl OracleDirectory {
    pub fn new(
        config: &ProtocolConfig,
        index_source: Arc<dyn IndexSource>,
        gate: Arc<OperationalGate>,
        events: Arc<EventLog>,
    ) -> Self {
        Self {
            oracles: RwLock::new(HashMap::new()),
            index_source,
            registration_fee: config.oracle_registration_fee,
            index_set_size: config.index_set_size,
            index_range: config.index_range,
            gate,
            events,
        }
    }

    /// Register an oracle node and return its indexes.
    ///
    /// Registering again returns the original assignment; indexes never
    /// change once drawn.
    pub async fn register_oracle(&self, identity: &Principal, fee_paid: Gwei) -> Result<BTreeSet<u8>> {
        self.gate.require_operational()?;

        if fee_paid < self.registration_fee {
            warn!(
                "Oracle {} paid {} gwei, fee is {}",
                identity, fee_paid, self.registration_fee
            );
            return Err(FlightSuretyError::InsufficientFee {
                paid: fee_paid,
                required: self.registration_fee,
            });
        }

        let indexes = {
            let mut oracles = self.oracles.write().await;
            if let Some(existing) = oracles.get(identity) {
                debug!("Oracle {} already registered", identity);
                return Ok(existing.indexes.clone());
            }

            let indexes = draw_index_set(
                self.index_source.as_ref(),
                identity.as_str().as_bytes(),
                self.index_set_size,
                self.index_range,
            );
            oracles.insert(
                identity.clone(),
                OracleNode {
                    identity: identity.clone(),
                    indexes: indexes.clone(),
                    registered: true,
                },
            );
            indexes
        };

        info!("Oracle {} registered with indexes {:?}", identity, indexes);
        self.events
            .append(ProtocolEvent::OracleRegistered {
                oracle: identity.clone(),
                indexes: indexes.iter().copied().collect(),
            })
            .await;

        Ok(indexes)
    }

    pub async fn get_my_indexes(&self, identity: &Principal) -> Result<BTreeSet<u8>> {
        self.oracles
            .read()
            .await
            .get(identity)
            .filter(|o| o.registered)
            .map(|o| o.indexes.clone())
            .ok_or_else(|| FlightSuretyError::NotRegistered(identity.clone()))
    }

    /// Oracles whose index set contains `index`, sorted by identity
    pub async fn oracles_for_index(&self, index: u8) -> Vec<Principal> {
        let mut matching: Vec<Principal> = self
            .oracles
            .read()
            .await
            .values()
            .filter(|o| o.has_index(index))
            .map(|o| o.identity.clone())
            .collect();
        matching.sort();
        matching
    }

    pub async fn len(&self) -> usize {
        self.oracles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.oracles.read().await.is_empty()
    }

    pub fn registration_fee(&self) -> Gwei {
        self.registration_fee
    }
}
