pub mod signer;

pub use signer::{LedgerSigner, verify_transaction};
