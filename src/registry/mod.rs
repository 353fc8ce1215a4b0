pub mod certificate;
pub mod events;
pub mod search;
pub mod service;
pub mod store;

pub use certificate::{CertHash, Certificate, IssueRequest, QueryResult};
pub use events::{EventBus, RegistryEvent};
pub use search::{DateRange, Keyword, SearchField};
pub use service::CertificateRegistry;
pub use store::{CertificateStore, SnapshotError};
