use super::certificate::{CertHash, Certificate, IssueRequest, QueryResult};
use super::events::{EventBus, RegistryEvent};
use super::search::{DateRange, Keyword, SearchField};
use super::store::{CertificateStore, SnapshotError};
use crate::access::{AccessControl, Address, Role, RoleChange};
use crate::config::RegistryConfig;
use crate::crypto::LedgerSigner;
use crate::error::{RegistryError, Result};
use crate::ledger::{Journal, LedgerClock, LedgerTransaction, SystemClock, TransactionType};
use crate::network::LedgerGateway;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

/// Certificate registry: gated issuance, student-scoped reads and
/// admin-only scans over one append-only store.
pub struct CertificateRegistry {
    access: AccessControl,
    store: CertificateStore,
    clock: Arc<dyn LedgerClock>,
    events: EventBus,
    journal: Journal,
    gateway: Option<Arc<dyn LedgerGateway>>,
    reject_blank_fields: bool,
    /// Held by every write from the state change through its journal entry,
    /// event and gateway submission, so all four observe one order.
    write_lock: Mutex<()>,
}

impl CertificateRegistry {
    /// Fresh registry whose deployer holds the default admin and admin roles.
    pub fn deploy(deployer: Address) -> Self {
        Self {
            access: AccessControl::new(deployer),
            store: CertificateStore::new(),
            clock: Arc::new(SystemClock),
            events: EventBus::new(1024),
            journal: Journal::new(Arc::new(LedgerSigner::generate())),
            gateway: None,
            reject_blank_fields: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Deploys a registry over the certificates saved by [`save_snapshot`].
    /// Roles are not part of the snapshot; `deployer` starts with both admin roles.
    ///
    /// [`save_snapshot`]: CertificateRegistry::save_snapshot
    pub async fn load_snapshot(deployer: Address, path: &Path) -> std::result::Result<Self, SnapshotError> {
        let store = CertificateStore::load(path).await?;
        info!("restored {} certificate(s) from {}", store.len().await, path.display());
        Ok(Self::deploy(deployer).with_store(store))
    }

    /// Deploys with config settings and grants the admin role to `config.admins`.
    pub async fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::deploy(config.deployer);
        registry.events = EventBus::new(config.event_capacity);
        registry.reject_blank_fields = config.reject_blank_fields;

        for admin in &config.admins {
            registry
                .grant_role(config.deployer, Role::admin(), *admin)
                .await?;
        }
        Ok(registry)
    }

    pub fn with_clock(mut self, clock: Arc<dyn LedgerClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn LedgerGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_signer(mut self, signer: Arc<LedgerSigner>) -> Self {
        self.journal = Journal::new(signer);
        self
    }

    /// Replaces the (empty) store, typically with one loaded from a snapshot.
    pub fn with_store(mut self, store: CertificateStore) -> Self {
        self.store = store;
        self
    }

    pub fn reject_blank_fields(mut self, reject: bool) -> Self {
        self.reject_blank_fields = reject;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    // ─── Roles ──────────────────────────────────────────────────────────────

    pub async fn has_role(&self, role: Role, account: Address) -> bool {
        self.access.has_role(role, account).await
    }

    pub async fn grant_role(&self, caller: Address, role: Role, account: Address) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.access.grant_role(caller, role, account).await? == RoleChange::Changed {
            self.announce(RegistryEvent::RoleGranted {
                role,
                account,
                sender: caller,
            })
            .await;
        }
        Ok(())
    }

    pub async fn revoke_role(&self, caller: Address, role: Role, account: Address) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.access.revoke_role(caller, role, account).await? == RoleChange::Changed {
            self.announce(RegistryEvent::RoleRevoked {
                role,
                account,
                sender: caller,
            })
            .await;
        }
        Ok(())
    }

    pub async fn renounce_role(&self, caller: Address, role: Role) {
        let _guard = self.write_lock.lock().await;
        if self.access.renounce_role(caller, role).await == RoleChange::Changed {
            self.announce(RegistryEvent::RoleRevoked {
                role,
                account: caller,
                sender: caller,
            })
            .await;
        }
    }

    // ─── Issuance ───────────────────────────────────────────────────────────

    pub async fn issue_certificate(&self, caller: Address, request: IssueRequest) -> Result<CertHash> {
        self.access.require_admin(caller).await?;

        if self.reject_blank_fields {
            if let Some(field) = request.blank_field() {
                return Err(RegistryError::BlankField(field));
            }
        }

        let _guard = self.write_lock.lock().await;
        let cert = self.store.append(request, self.clock.as_ref()).await;
        info!(
            "certificate {} issued to {} for \"{}\" at {}",
            cert.cert_hash, cert.student, cert.course_name, cert.issued_date
        );

        self.events.emit(RegistryEvent::CertificateIssued {
            cert_hash: cert.cert_hash,
            student: cert.student,
        });
        self.commit(
            cert.cert_hash.to_string(),
            TransactionType::CertificateIssuance,
            &cert,
        )
        .await;

        Ok(cert.cert_hash)
    }

    /// Public lookup, not scoped to any student.
    pub async fn certificate_by_hash(&self, hash: &CertHash) -> Result<Certificate> {
        self.store.get(hash).await.ok_or(RegistryError::NotFound)
    }

    // ─── Student queries ────────────────────────────────────────────────────

    pub async fn student_certificates(&self, student: Address) -> QueryResult {
        self.store.scan(|c| c.student == student).await.into()
    }

    pub async fn student_certificates_by_course_name(
        &self,
        student: Address,
        keyword: &str,
    ) -> Result<QueryResult> {
        self.student_keyword_search(student, keyword, SearchField::CourseName)
            .await
    }

    pub async fn student_certificates_by_course_type(
        &self,
        student: Address,
        keyword: &str,
    ) -> Result<QueryResult> {
        self.student_keyword_search(student, keyword, SearchField::CourseType)
            .await
    }

    pub async fn student_certificates_by_course_level(
        &self,
        student: Address,
        keyword: &str,
    ) -> Result<QueryResult> {
        self.student_keyword_search(student, keyword, SearchField::CourseLevel)
            .await
    }

    pub async fn student_certificates_by_date(
        &self,
        student: Address,
        start: i64,
        end: i64,
    ) -> QueryResult {
        let range = DateRange::new(start, end);
        self.store
            .scan(|c| c.student == student && range.contains(c))
            .await
            .into()
    }

    pub async fn student_certificate_by_hash(
        &self,
        student: Address,
        hash: &CertHash,
    ) -> Result<Certificate> {
        let cert = self.certificate_by_hash(hash).await?;
        if cert.student != student {
            return Err(RegistryError::NotOwnedByStudent);
        }
        Ok(cert)
    }

    async fn student_keyword_search(
        &self,
        student: Address,
        keyword: &str,
        field: SearchField,
    ) -> Result<QueryResult> {
        let keyword = Keyword::parse(keyword)?;
        let found = self
            .store
            .scan(|c| c.student == student && keyword.matches_field(field, c))
            .await;
        debug!("{:?} search for {}: {} match(es)", field, student, found.len());
        Ok(found.into())
    }

    // ─── Admin queries ──────────────────────────────────────────────────────

    pub async fn admin_search_by_course(&self, caller: Address, keyword: &str) -> Result<QueryResult> {
        self.admin_keyword_search(caller, keyword, SearchField::CourseName)
            .await
    }

    pub async fn admin_search_by_student_name(
        &self,
        caller: Address,
        keyword: &str,
    ) -> Result<QueryResult> {
        self.admin_keyword_search(caller, keyword, SearchField::StudentName)
            .await
    }

    pub async fn admin_search_by_course_type(
        &self,
        caller: Address,
        keyword: &str,
    ) -> Result<QueryResult> {
        self.admin_keyword_search(caller, keyword, SearchField::CourseType)
            .await
    }

    pub async fn admin_search_by_course_level(
        &self,
        caller: Address,
        keyword: &str,
    ) -> Result<QueryResult> {
        self.admin_keyword_search(caller, keyword, SearchField::CourseLevel)
            .await
    }

    pub async fn admin_search_by_date(&self, caller: Address, start: i64, end: i64) -> Result<QueryResult> {
        self.access.require_admin(caller).await?;
        let range = DateRange::new(start, end);
        Ok(self.store.scan(|c| range.contains(c)).await.into())
    }

    pub async fn all_certificates(&self, caller: Address) -> Result<QueryResult> {
        self.access.require_admin(caller).await?;
        Ok(self.store.scan(|_| true).await.into())
    }

    async fn admin_keyword_search(
        &self,
        caller: Address,
        keyword: &str,
        field: SearchField,
    ) -> Result<QueryResult> {
        self.access.require_admin(caller).await?;
        let keyword = Keyword::parse(keyword)?;
        let found = self
            .store
            .scan(|c| keyword.matches_field(field, c))
            .await;
        debug!("admin {:?} search: {} match(es)", field, found.len());
        Ok(found.into())
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    pub async fn save_snapshot(&self, path: &Path) -> std::result::Result<(), SnapshotError> {
        self.store.save(path).await?;
        info!("snapshot of {} certificate(s) written to {}", self.store.len().await, path.display());
        Ok(())
    }

    // ─── Ledger plumbing ────────────────────────────────────────────────────

    /// Caller must hold `write_lock`; the tx id is the journal position.
    async fn announce(&self, event: RegistryEvent) {
        let tx_type = match &event {
            RegistryEvent::RoleRevoked { .. } => TransactionType::RoleRevocation,
            RegistryEvent::RoleGranted { .. } => TransactionType::RoleGrant,
            RegistryEvent::CertificateIssued { .. } => TransactionType::CertificateIssuance,
        };
        let tx_id = format!("{}-{}", tx_type.function_name(), self.journal.len().await);
        self.commit(tx_id, tx_type, &event).await;
        self.events.emit(event);
    }

    /// Journals a signed transaction and mirrors it to the gateway. Gateway
    /// failures leave the committed write in place. A payload that cannot be
    /// encoded is neither journaled nor submitted.
    async fn commit<T: Serialize>(&self, tx_id: String, tx_type: TransactionType, payload: &T) {
        let data = match serde_json::to_vec(payload) {
            Ok(data) => data,
            Err(e) => {
                error!("cannot encode journal payload for {}, not journaled: {}", tx_id, e);
                return;
            }
        };
        let tx = self
            .journal
            .record(LedgerTransaction::new(tx_id, tx_type, data))
            .await;

        if let Some(gateway) = &self.gateway {
            if let Err(e) = gateway.submit_transaction(&tx).await {
                warn!("gateway rejected {}: {}", tx.tx_id, e);
            }
        }
    }
}
