use super::gateway::{GatewayError, LedgerGateway};
use crate::ledger::LedgerTransaction;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

/// A submitted call as the external contract would receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub function: &'static str,
    pub args: Vec<String>,
}

/// In-process stand-in for a remote ledger endpoint.
pub struct SimulatedGateway {
    channel: String,
    contract: String,
    submit_latency: Duration,
    connected: Arc<Mutex<bool>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl SimulatedGateway {
    pub fn new(channel: String, contract: String, submit_latency: Duration) -> Self {
        Self {
            channel,
            contract,
            submit_latency,
            connected: Arc::new(Mutex::new(false)),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl LedgerGateway for SimulatedGateway {
    async fn connect(&self) -> Result<(), GatewayError> {
        info!(
            "connecting gateway: channel={} contract={}",
            self.channel, self.contract
        );
        sleep(self.submit_latency).await;
        *self.connected.lock().await = true;
        Ok(())
    }

    async fn submit_transaction(&self, tx: &LedgerTransaction) -> Result<(), GatewayError> {
        if !*self.connected.lock().await {
            return Err(GatewayError::NotConnected(self.channel.clone()));
        }
        if tx.signature.is_empty() {
            return Err(GatewayError::Rejected(format!("unsigned transaction {}", tx.tx_id)));
        }

        sleep(self.submit_latency).await;

        let submission = Submission {
            function: tx.tx_type.function_name(),
            args: vec![tx.tx_id.clone(), hex::encode(&tx.data)],
        };
        debug!("gateway submit {} {}", submission.function, tx.tx_id);
        self.submissions.lock().await.push(submission);
        Ok(())
    }
}
