use super::transaction::LedgerTransaction;
use crate::crypto::{LedgerSigner, verify_transaction};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only record of every signed write the registry committed.
pub struct Journal {
    signer: Arc<LedgerSigner>,
    entries: Arc<RwLock<Vec<LedgerTransaction>>>,
}

impl Journal {
    pub fn new(signer: Arc<LedgerSigner>) -> Self {
        Self {
            signer,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Signs the transaction, appends it, and returns the signed copy.
    pub async fn record(&self, mut tx: LedgerTransaction) -> LedgerTransaction {
        self.signer.sign(&mut tx);
        self.entries.write().await.push(tx.clone());
        tx
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn signer(&self) -> &LedgerSigner {
        &self.signer
    }

    pub async fn entries(&self) -> Vec<LedgerTransaction> {
        self.entries.read().await.clone()
    }

    /// Indices of entries whose signature does not verify.
    pub async fn verify_all(&self) -> Vec<usize> {
        let key = self.signer.verifying_key();
        self.entries
            .read()
            .await
            .iter()
            .enumerate()
            .filter(|(_, tx)| !verify_transaction(&key, tx))
            .map(|(i, _)| i)
            .collect()
    }
}
