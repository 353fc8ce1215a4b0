use crate::access::Address;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Primary key of a certificate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertHash([u8; 32]);

impl CertHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CertHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for CertHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for CertHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for CertHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

/// One completed-course attestation. Fields are fixed at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub student: Address,
    pub student_name: String,
    pub issuer: Address,
    pub issuer_name: String,
    pub course_name: String,
    pub course_type: Option<String>,
    pub course_level: Option<String>,
    pub metadata_uri: String,
    pub cert_hash: CertHash,
    pub issued_date: i64,
}

impl Certificate {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.issued_date, 0).single()
    }
}

/// Inputs to issuance. `new` covers the base variant; course type and
/// level are attached with [`IssueRequest::with_course_details`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    pub student: Address,
    pub student_name: String,
    pub issuer: Address,
    pub issuer_name: String,
    pub course_name: String,
    pub course_type: Option<String>,
    pub course_level: Option<String>,
    pub metadata_uri: String,
}

impl IssueRequest {
    pub fn new(
        student: Address,
        student_name: impl Into<String>,
        issuer: Address,
        issuer_name: impl Into<String>,
        course_name: impl Into<String>,
        metadata_uri: impl Into<String>,
    ) -> Self {
        Self {
            student,
            student_name: student_name.into(),
            issuer,
            issuer_name: issuer_name.into(),
            course_name: course_name.into(),
            course_type: None,
            course_level: None,
            metadata_uri: metadata_uri.into(),
        }
    }

    pub fn with_course_details(
        mut self,
        course_type: impl Into<String>,
        course_level: impl Into<String>,
    ) -> Self {
        self.course_type = Some(course_type.into());
        self.course_level = Some(course_level.into());
        self
    }

    /// First blank required field, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        if self.student.is_zero() {
            return Some("student");
        }
        [
            ("student_name", &self.student_name),
            ("issuer_name", &self.issuer_name),
            ("course_name", &self.course_name),
            ("metadata_uri", &self.metadata_uri),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Hash over every field plus ledger time and the store sequence number.
    /// Fields are length-prefixed so adjacent values cannot run together.
    pub(crate) fn derive_hash(&self, issued_date: i64, sequence: u64) -> CertHash {
        fn field(hasher: &mut Sha256, bytes: &[u8]) {
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        }

        let mut hasher = Sha256::new();
        field(&mut hasher, self.student.as_bytes());
        field(&mut hasher, self.student_name.as_bytes());
        field(&mut hasher, self.issuer.as_bytes());
        field(&mut hasher, self.issuer_name.as_bytes());
        field(&mut hasher, self.course_name.as_bytes());
        field(&mut hasher, self.course_type.as_deref().unwrap_or("").as_bytes());
        field(&mut hasher, self.course_level.as_deref().unwrap_or("").as_bytes());
        field(&mut hasher, self.metadata_uri.as_bytes());
        hasher.update(issued_date.to_be_bytes());
        hasher.update(sequence.to_be_bytes());
        CertHash(hasher.finalize().into())
    }

    pub(crate) fn into_certificate(self, cert_hash: CertHash, issued_date: i64) -> Certificate {
        Certificate {
            student: self.student,
            student_name: self.student_name,
            issuer: self.issuer,
            issuer_name: self.issuer_name,
            course_name: self.course_name,
            course_type: self.course_type,
            course_level: self.course_level,
            metadata_uri: self.metadata_uri,
            cert_hash,
            issued_date,
        }
    }
}

/// Matching records in store order, with their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    certificates: Vec<Certificate>,
    total: usize,
}

impl QueryResult {
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn into_certificates(self) -> Vec<Certificate> {
        self.certificates
    }

    pub fn course_names(&self) -> Vec<&str> {
        self.certificates
            .iter()
            .map(|c| c.course_name.as_str())
            .collect()
    }
}

impl From<Vec<Certificate>> for QueryResult {
    fn from(certificates: Vec<Certificate>) -> Self {
        let total = certificates.len();
        Self {
            certificates,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> IssueRequest {
        IssueRequest::new(
            Address::from_label("student1"),
            "Nguyen Van A",
            Address::from_label("issuer"),
            "IUH University",
            "Blockchain Development",
            "ipfs://test-metadata",
        )
    }

    #[test]
    fn hash_depends_on_time_and_sequence() {
        let req = request();
        let base = req.derive_hash(100, 0);
        assert_eq!(base, req.derive_hash(100, 0));
        assert_ne!(base, req.derive_hash(101, 0));
        assert_ne!(base, req.derive_hash(100, 1));
    }

    #[test]
    fn length_prefix_separates_fields() {
        let a = IssueRequest::new(Address::ZERO, "ab", Address::ZERO, "c", "x", "u");
        let b = IssueRequest::new(Address::ZERO, "a", Address::ZERO, "bc", "x", "u");
        assert_ne!(a.derive_hash(1, 0), b.derive_hash(1, 0));
    }

    #[test]
    fn blank_field_detection() {
        assert_eq!(request().blank_field(), None);

        let mut req = request();
        req.course_name = "   ".into();
        assert_eq!(req.blank_field(), Some("course_name"));

        req.student = Address::ZERO;
        assert_eq!(req.blank_field(), Some("student"));
    }

    #[test]
    fn cert_hash_text_form() {
        let hash = request().derive_hash(1, 0);
        let text = hash.to_string();
        assert_eq!(text.len(), 66);
        assert_eq!(text.parse::<CertHash>().unwrap(), hash);
        assert!("0x1234".parse::<CertHash>().is_err());
    }

    #[test]
    fn query_result_total_matches_len() {
        let cert = request().into_certificate(CertHash::new([7; 32]), 10);
        let result = QueryResult::from(vec![cert.clone(), cert]);
        assert_eq!(result.total(), 2);
        assert_eq!(result.certificates().len(), result.total());
        assert!(QueryResult::from(Vec::new()).is_empty());
    }
}
