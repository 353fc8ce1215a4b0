use crate::ledger::LedgerTransaction;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway is not connected to {0}")]
    NotConnected(String),
    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Mirrors committed registry transactions to an external ledger.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn connect(&self) -> Result<(), GatewayError>;
    async fn submit_transaction(&self, tx: &LedgerTransaction) -> Result<(), GatewayError>;
}
