use crate::ledger::LedgerTransaction;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Signs journal transactions on behalf of the registry.
pub struct LedgerSigner {
    signing_key: SigningKey,
    signatures_issued: AtomicU64,
}

impl LedgerSigner {
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        Self::from_key(SigningKey::generate(&mut csprng))
    }

    pub fn from_key(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            signatures_issued: AtomicU64::new(0),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn sign(&self, tx: &mut LedgerTransaction) {
        let signature = self.signing_key.sign(&tx.signing_payload());
        tx.signature = signature.to_bytes().to_vec();
        self.signatures_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn signatures_issued(&self) -> u64 {
        self.signatures_issued.load(Ordering::Relaxed)
    }
}

pub fn verify_transaction(key: &VerifyingKey, tx: &LedgerTransaction) -> bool {
    let Ok(bytes) = <&[u8; 64]>::try_from(tx.signature.as_slice()) else {
        return false;
    };
    let signature = Signature::from_bytes(bytes);
    key.verify(&tx.signing_payload(), &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionType;

    #[test]
    fn signed_transaction_verifies() {
        let signer = LedgerSigner::generate();
        let mut tx = LedgerTransaction::new(
            "0xabc".to_string(),
            TransactionType::CertificateIssuance,
            b"payload".to_vec(),
        );
        assert!(!verify_transaction(&signer.verifying_key(), &tx));

        signer.sign(&mut tx);
        assert!(verify_transaction(&signer.verifying_key(), &tx));
        assert_eq!(signer.signatures_issued(), 1);

        tx.data.push(0);
        assert!(!verify_transaction(&signer.verifying_key(), &tx));
    }
}
