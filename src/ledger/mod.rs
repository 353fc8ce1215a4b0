pub mod clock;
pub mod journal;
pub mod transaction;

pub use clock::{LedgerClock, ManualClock, SystemClock};
pub use journal::Journal;
pub use transaction::{LedgerTransaction, TransactionType};
