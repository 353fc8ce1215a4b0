use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub tx_id: String,
    pub tx_type: TransactionType,
    pub timestamp: DateTime<Utc>,
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    CertificateIssuance,
    RoleGrant,
    RoleRevocation,
}

impl TransactionType {
    /// Contract function the transaction corresponds to on an external ledger.
    pub fn function_name(&self) -> &'static str {
        match self {
            TransactionType::CertificateIssuance => "issueCertificate",
            TransactionType::RoleGrant => "grantRole",
            TransactionType::RoleRevocation => "revokeRole",
        }
    }
}

impl LedgerTransaction {
    pub fn new(tx_id: String, tx_type: TransactionType, data: Vec<u8>) -> Self {
        Self {
            tx_id,
            tx_type,
            timestamp: Utc::now(),
            data,
            signature: vec![],
        }
    }

    /// Bytes covered by the signature.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.tx_id.len() + self.data.len() + 32);
        payload.extend_from_slice(self.tx_id.as_bytes());
        payload.extend_from_slice(self.tx_type.function_name().as_bytes());
        payload.extend_from_slice(&self.timestamp.timestamp_millis().to_be_bytes());
        payload.extend_from_slice(&self.data);
        payload
    }
}
