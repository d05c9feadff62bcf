//! System-wide operational switch
//!
//! Every mutating entry point calls [`OperationalGate::require_operational`]
//! first. Reads stay available while paused.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{FlightSuretyError, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::types::Principal;

pub struct OperationalGate {
    operational: AtomicBool,
    /// Serializes flag changes with their events so the log order matches
    /// the order of the swaps
    transition: Mutex<()>,
    authority: Principal,
    events: Arc<EventLog>,
}

impl OperationalGate {
    pub fn new(authority: Principal, events: Arc<EventLog>) -> Self {
        Self {
            operational: AtomicBool::new(true),
            transition: Mutex::new(()),
            authority,
            events,
        }
    }

    pub fn is_operational(&self) -> bool {
        self.operational.load(Ordering::SeqCst)
    }

    pub fn authority(&self) -> &Principal {
        &self.authority
    }

    /// Toggle the flag. Only the authority may call this.
    pub async fn set_operational(&self, operational: bool, caller: &Principal) -> Result<()> {
        if caller != &self.authority {
            warn!("Rejected operational change from {}", caller);
            return Err(FlightSuretyError::Unauthorized(caller.clone()));
        }

        let _transition = self.transition.lock().await;
        let previous = self.operational.swap(operational, Ordering::SeqCst);
        if previous != operational {
            info!("Operational status set to {}", operational);
            self.events
                .append(ProtocolEvent::OperationalStatusChanged { operational })
                .await;
        }
        Ok(())
    }

    pub fn require_operational(&self) -> Result<()> {
        if self.is_operational() {
            Ok(())
        } else {
            Err(FlightSuretyError::SystemPaused)
        }
    }
}
