//! Event Log
//!
//! Append-only, pollable log of protocol events. Writers append; relays keep
//! their own cursor and read forward from it.

use tokio::sync::{Notify, RwLock};
use tracing::debug;

use super::entry::{EventRecord, ProtocolEvent, GENESIS_HASH};

#[derive(Default)]
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
    appended: Notify,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number
    pub async fn append(&self, event: ProtocolEvent) -> u64 {
        let sequence = {
            let mut records = self.records.write().await;
            let previous_hash = records
                .last()
                .map(|r| r.this_hash.clone())
                .unwrap_or_else(|| GENESIS_HASH.to_string());
            let sequence = records.len() as u64;
            let record = EventRecord::new(sequence, event, previous_hash);
            debug!("Event #{}: {}", sequence, record.event.name());
            records.push(record);
            sequence
        };
        self.appended.notify_waiters();
        sequence
    }

    /// Records with `sequence >= cursor`
    pub async fn events_since(&self, cursor: u64) -> Vec<EventRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .skip(cursor as usize)
            .cloned()
            .collect()
    }

    /// Wait until at least one record at or after `cursor` exists and return
    /// everything from the cursor on.
    pub async fn wait_for_events(&self, cursor: u64) -> Vec<EventRecord> {
        loop {
            // Register interest before checking so an append between the
            // check and the await is not missed
            let notified = self.appended.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let records = self.events_since(cursor).await;
            if !records.is_empty() {
                return records;
            }
            notified.await;
        }
    }

    pub async fn len(&self) -> u64 {
        self.records.read().await.len() as u64
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn head_hash(&self) -> String {
        self.records
            .read()
            .await
            .last()
            .map(|r| r.this_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string())
    }

    /// Check every record hash and link
    pub async fn verify_chain(&self) -> bool {
        verify_records(&self.records.read().await)
    }
}

/// Verify a slice of records polled from the start of a log
pub fn verify_records(records: &[EventRecord]) -> bool {
    let mut previous = GENESIS_HASH.to_string();
    for (i, record) in records.iter().enumerate() {
        if record.sequence != i as u64
            || record.previous_hash != previous
            || !record.verify_hash()
        {
            return false;
        }
        previous = record.this_hash.clone();
    }
    true
}
