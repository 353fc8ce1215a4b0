use crate::access::{Address, Role};
use thiserror::Error;

/// Failures surfaced by registry operations. None of them are transient.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("account {account} is missing role {role}")]
    Unauthorized { account: Address, role: Role },

    #[error("Keyword cannot be empty")]
    EmptyKeyword,

    /// Shared by the public and the student-scoped hash lookup.
    #[error("Certificate not found")]
    NotFound,

    #[error("Certificate does not belong to this student.")]
    NotOwnedByStudent,

    #[error("field `{0}` cannot be blank")]
    BlankField(&'static str),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_contract_reverts() {
        assert_eq!(RegistryError::EmptyKeyword.to_string(), "Keyword cannot be empty");
        assert_eq!(RegistryError::NotFound.to_string(), "Certificate not found");
        assert_eq!(
            RegistryError::NotOwnedByStudent.to_string(),
            "Certificate does not belong to this student."
        );
    }
}
