//! Protocol Event Log
//!
//! Outbound events observed by relays and front ends: admissions, oracle
//! requests and their finalization, operational status changes.

pub mod entry;
pub mod log;

pub use entry::{EventRecord, ProtocolEvent, GENESIS_HASH};
pub use log::{verify_records, EventLog};
