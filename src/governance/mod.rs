//! Airline Governance
//!
//! Sponsored registration with automatic admission below a threshold and
//! majority voting above it.

pub mod registry;
pub mod types;
pub mod voting;

pub use registry::MemberRegistry;
pub use types::*;
pub use voting::VotingLedger;
