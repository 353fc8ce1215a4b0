//! Append-only registry of course-completion certificates with role-gated
//! issuance, student-scoped lookups and admin-wide searches.

pub mod access;
pub mod config;
pub mod crypto;
pub mod error;
pub mod export;
pub mod ledger;
pub mod network;
pub mod registry;

pub use access::{Address, Role};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::{CertHash, Certificate, CertificateRegistry, IssueRequest, QueryResult, RegistryEvent};
