use super::certificate::{CertHash, Certificate, IssueRequest};
use crate::ledger::LedgerClock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("snapshot contains duplicate hash {0}")]
    DuplicateHash(CertHash),
    #[error("snapshot version {0} is not supported")]
    UnsupportedVersion(u32),
}

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    records: Vec<Certificate>,
}

#[derive(Default)]
struct StoreInner {
    records: Vec<Certificate>,
    by_hash: HashMap<CertHash, usize>,
}

impl StoreInner {
    fn push(&mut self, cert: Certificate) -> Result<(), CertHash> {
        if self.by_hash.contains_key(&cert.cert_hash) {
            return Err(cert.cert_hash);
        }
        self.by_hash.insert(cert.cert_hash, self.records.len());
        self.records.push(cert);
        Ok(())
    }
}

/// Append-only certificate log with a hash index. The log and the index
/// share one lock so readers never see one without the other.
#[derive(Default)]
pub struct CertificateStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl CertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the request with ledger time and appends it.
    ///
    /// Time is read under the write lock and never goes below the previous
    /// record's date, so store order is also `issued_date` order.
    pub async fn append(&self, request: IssueRequest, clock: &dyn LedgerClock) -> Certificate {
        let mut inner = self.inner.write().await;

        let floor = inner.records.last().map_or(i64::MIN, |c| c.issued_date);
        let issued_date = clock.now().max(floor);
        let mut sequence = inner.records.len() as u64;
        let mut cert_hash = request.derive_hash(issued_date, sequence);
        while inner.by_hash.contains_key(&cert_hash) {
            sequence += 1;
            cert_hash = request.derive_hash(issued_date, sequence);
        }

        let cert = request.into_certificate(cert_hash, issued_date);
        let position = inner.records.len();
        inner.by_hash.insert(cert_hash, position);
        inner.records.push(cert.clone());
        cert
    }

    pub async fn get(&self, hash: &CertHash) -> Option<Certificate> {
        let inner = self.inner.read().await;
        inner
            .by_hash
            .get(hash)
            .map(|&idx| inner.records[idx].clone())
    }

    /// Records satisfying `keep`, in insertion order.
    pub async fn scan<F>(&self, keep: F) -> Vec<Certificate>
    where
        F: Fn(&Certificate) -> bool,
    {
        self.inner
            .read()
            .await
            .records
            .iter()
            .filter(|c| keep(c))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let inner = self.inner.read().await;
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            records: inner.records.clone(),
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    pub fn restore(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }

        let mut inner = StoreInner::default();
        for cert in snapshot.records {
            inner.push(cert).map_err(SnapshotError::DuplicateHash)?;
        }

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.snapshot().await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = tokio::fs::read(path).await?;
        Self::restore(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Address;
    use crate::ledger::ManualClock;

    fn request(course: &str) -> IssueRequest {
        IssueRequest::new(
            Address::from_label("student"),
            "Student",
            Address::from_label("issuer"),
            "IUH",
            course,
            "ipfs://1",
        )
    }

    #[tokio::test]
    async fn append_indexes_by_hash() {
        let store = CertificateStore::new();
        let clock = ManualClock::new(1_000);
        let cert = store.append(request("Course 1"), &clock).await;

        assert_eq!(cert.issued_date, 1_000);
        assert_eq!(store.get(&cert.cert_hash).await, Some(cert));
        assert_eq!(store.get(&CertHash::new([9; 32])).await, None);
    }

    #[tokio::test]
    async fn identical_requests_get_distinct_hashes() {
        let store = CertificateStore::new();
        let clock = ManualClock::new(1_000);
        let a = store.append(request("Same"), &clock).await;
        let b = store.append(request("Same"), &clock).await;
        assert_ne!(a.cert_hash, b.cert_hash);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn issued_date_never_goes_backwards() {
        let store = CertificateStore::new();
        let clock = ManualClock::new(500);
        store.append(request("First"), &clock).await;
        clock.set(100);
        let second = store.append(request("Second"), &clock).await;
        assert_eq!(second.issued_date, 500);
    }

    #[tokio::test]
    async fn scan_preserves_insertion_order() {
        let store = CertificateStore::new();
        let clock = ManualClock::new(0);
        for name in ["First", "Second", "Third"] {
            store.append(request(name), &clock).await;
            clock.advance(1);
        }
        let names: Vec<String> = store
            .scan(|_| true)
            .await
            .into_iter()
            .map(|c| c.course_name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn snapshot_restores_records_and_index() {
        let store = CertificateStore::new();
        let clock = ManualClock::new(42);
        let cert = store.append(request("Persisted"), &clock).await;

        let bytes = store.snapshot().await.unwrap();
        let restored = CertificateStore::restore(&bytes).unwrap();
        assert_eq!(restored.len().await, 1);
        assert_eq!(restored.get(&cert.cert_hash).await, Some(cert));
    }

    #[tokio::test]
    async fn restore_rejects_duplicates() {
        let store = CertificateStore::new();
        let clock = ManualClock::new(42);
        let cert = store.append(request("Dup"), &clock).await;

        let bytes = bincode::serialize(&Snapshot {
            version: SNAPSHOT_VERSION,
            records: vec![cert.clone(), cert.clone()],
        })
        .unwrap();
        assert!(matches!(
            CertificateStore::restore(&bytes),
            Err(SnapshotError::DuplicateHash(h)) if h == cert.cert_hash
        ));
    }

    #[test]
    fn restore_rejects_unknown_version() {
        let bytes = bincode::serialize(&Snapshot {
            version: 99,
            records: vec![],
        })
        .unwrap();
        assert!(matches!(
            CertificateStore::restore(&bytes),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }
}
