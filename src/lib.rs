pub mod config;
pub mod error;
pub mod events;
pub mod flights;
pub mod governance;
pub mod operational;
pub mod oracles;
pub mod relay;
pub mod system;
pub mod types;

pub use error::{FlightSuretyError, Result};
pub use system::FlightSurety;
pub use types::{ether, Gwei, Principal};
