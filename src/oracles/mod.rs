//! Oracle Consensus
//!
//! Oracle node registration with index assignment, and quorum-based
//! finalization of flight status requests.

pub mod coordinator;
pub mod directory;
pub mod index_source;
pub mod types;

pub use coordinator::RequestCoordinator;
pub use directory::OracleDirectory;
pub use index_source::{draw_index_set, HashIndexSource, IndexSource, ThreadRngIndexSource};
pub use types::*;
