//! Oracle Types and Data Structures

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::FlightSuretyError;
use crate::flights::{FlightKey, FlightStatus};
use crate::types::Principal;

/// Identifier of an oracle request: SHA-256 over the group index, owning
/// airline, flight code and departure timestamp.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey([u8; 32]);

impl RequestKey {
    pub fn derive(group_index: u8, flight: &FlightKey, timestamp: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([group_index]);
        hasher.update(flight.owner.as_str().as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0u8]);
        hasher.update(flight.flight_code.as_bytes());
        hasher.update([0u8]);
        hasher.update(timestamp.to_be_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestKey({})", self)
    }
}

impl FromStr for RequestKey {
    type Err = FlightSuretyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|_| FlightSuretyError::UnknownRequest(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| FlightSuretyError::UnknownRequest(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for RequestKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RequestKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Registered oracle node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleNode {
    pub identity: Principal,
    pub indexes: BTreeSet<u8>,
    pub registered: bool,
}

impl OracleNode {
    pub fn has_index(&self, index: u8) -> bool {
        self.registered && self.indexes.contains(&index)
    }
}

/// Request lifecycle; `Finalized` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Open,
    Finalized(FlightStatus),
}

/// A single oracle response, kept for audit whether or not it counted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
    pub oracle: Principal,
    pub status: FlightStatus,
    /// Whether the response arrived while the request was still open
    pub counted: bool,
}

/// Oracle request with its collected responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    pub key: RequestKey,
    pub flight: FlightKey,
    pub timestamp: u64,
    pub group_index: u8,
    pub state: RequestState,
    pub responses: Vec<OracleResponse>,
}

impl OracleRequest {
    pub fn new(key: RequestKey, flight: FlightKey, timestamp: u64, group_index: u8) -> Self {
        Self {
            key,
            flight,
            timestamp,
            group_index,
            state: RequestState::Open,
            responses: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }

    pub fn has_responded(&self, oracle: &Principal) -> bool {
        self.responses.iter().any(|r| &r.oracle == oracle)
    }

    /// Counted responses grouped by status
    pub fn buckets(&self) -> HashMap<FlightStatus, usize> {
        let mut buckets = HashMap::new();
        for response in self.responses.iter().filter(|r| r.counted) {
            *buckets.entry(response.status).or_insert(0) += 1;
        }
        buckets
    }
}

/// Handle returned when a request is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedRequest {
    pub key: RequestKey,
    pub group_index: u8,
}

/// Result of an accepted response submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
    /// Counted toward quorum; `matching` responses now agree on this status
    Recorded { matching: usize },
    /// This response completed the quorum
    Finalized(FlightStatus),
    /// Stored for audit only; the request had already finalized
    AlreadyFinalized(FlightStatus),
}
