pub mod gateway;
pub mod simulated;

pub use gateway::{GatewayError, LedgerGateway};
pub use simulated::{SimulatedGateway, Submission};
