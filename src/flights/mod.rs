//! Flight Catalog and Status Types

pub mod catalog;
pub mod types;

pub use catalog::FlightCatalog;
pub use types::*;
