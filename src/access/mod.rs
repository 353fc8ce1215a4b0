pub mod address;
pub mod roles;

pub use address::{Address, AddressParseError};
pub use roles::{AccessControl, Role, RoleChange};
