pub mod records;

pub use records::{write_csv, write_records};
