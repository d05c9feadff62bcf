//! Protocol Event Entry
//!
//! Events published for the relay layer, chained by SHA-256 so a poller can
//! check that the log it read has not been rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::flights::FlightStatus;
use crate::oracles::RequestKey;
use crate::types::{Gwei, Principal};

pub const GENESIS_HASH: &str =
    "sha256:0000000000000000000000000000000000000000000000000000000000000000";

/// Outbound protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    OperationalStatusChanged {
        operational: bool,
    },
    MemberFunded {
        member: Principal,
        funded_amount: Gwei,
        funded: bool,
    },
    CandidatePending {
        candidate: Principal,
        sponsor: Principal,
    },
    CandidateAdmitted {
        candidate: Principal,
    },
    FlightRegistered {
        flight_code: String,
        owner: Principal,
        departure_timestamp: u64,
    },
    OracleRegistered {
        oracle: Principal,
        indexes: Vec<u8>,
    },
    RequestOpened {
        request_key: RequestKey,
        group_index: u8,
        flight_code: String,
        owner: Principal,
        timestamp: u64,
    },
    OracleReport {
        request_key: RequestKey,
        oracle: Principal,
        status: FlightStatus,
    },
    RequestFinalized {
        request_key: RequestKey,
        flight_code: String,
        owner: Principal,
        status: FlightStatus,
    },
}

impl ProtocolEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolEvent::OperationalStatusChanged { .. } => "operational_status_changed",
            ProtocolEvent::MemberFunded { .. } => "member_funded",
            ProtocolEvent::CandidatePending { .. } => "candidate_pending",
            ProtocolEvent::CandidateAdmitted { .. } => "candidate_admitted",
            ProtocolEvent::FlightRegistered { .. } => "flight_registered",
            ProtocolEvent::OracleRegistered { .. } => "oracle_registered",
            ProtocolEvent::RequestOpened { .. } => "request_opened",
            ProtocolEvent::OracleReport { .. } => "oracle_report",
            ProtocolEvent::RequestFinalized { .. } => "request_finalized",
        }
    }
}

/// Sequenced, hash-chained event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub event: ProtocolEvent,
    pub previous_hash: String,
    pub this_hash: String,
}

impl EventRecord {
    pub fn new(sequence: u64, event: ProtocolEvent, previous_hash: String) -> Self {
        let mut record = Self {
            sequence,
            timestamp: Utc::now(),
            event,
            previous_hash,
            this_hash: String::new(),
        };
        record.this_hash = record.calculate_hash();
        record
    }

    /// Canonical string representation for hashing
    pub fn canonical_string(&self) -> String {
        // Serializing a plain enum of strings and integers cannot fail
        let event = serde_json::to_string(&self.event).unwrap_or_default();
        format!(
            "sequence:{}|timestamp:{}|event:{}|previous_hash:{}",
            self.sequence,
            self.timestamp.to_rfc3339(),
            event,
            self.previous_hash
        )
    }

    pub fn calculate_hash(&self) -> String {
        let hash = Sha256::digest(self.canonical_string().as_bytes());
        format!("sha256:{}", hex::encode(hash))
    }

    pub fn verify_hash(&self) -> bool {
        self.this_hash == self.calculate_hash()
    }
}
