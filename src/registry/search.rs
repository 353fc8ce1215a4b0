//! Predicates used by the linear scans over the certificate store.
//!
//! Keyword matching is a case-insensitive substring test using Unicode
//! lowercase. Date bounds are inclusive on both ends.

use super::certificate::Certificate;
use crate::error::{RegistryError, Result};

/// Text field a keyword search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    CourseName,
    CourseType,
    CourseLevel,
    StudentName,
}

impl SearchField {
    /// `None` for optional fields the record was issued without.
    pub fn value<'a>(&self, cert: &'a Certificate) -> Option<&'a str> {
        match self {
            SearchField::CourseName => Some(cert.course_name.as_str()),
            SearchField::CourseType => cert.course_type.as_deref(),
            SearchField::CourseLevel => cert.course_level.as_deref(),
            SearchField::StudentName => Some(cert.student_name.as_str()),
        }
    }
}

/// Keyword normalized for matching. Construction rejects the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword(String);

impl Keyword {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RegistryError::EmptyKeyword);
        }
        Ok(Self(raw.to_lowercase()))
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0)
    }

    pub fn matches_field(&self, field: SearchField, cert: &Certificate) -> bool {
        field.value(cert).is_some_and(|v| self.matches(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    /// An inverted range is accepted and matches nothing.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, cert: &Certificate) -> bool {
        self.start <= cert.issued_date && cert.issued_date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Address;
    use crate::registry::certificate::{CertHash, IssueRequest};

    fn cert(course: &str, course_type: Option<&str>, issued_date: i64) -> Certificate {
        let mut req = IssueRequest::new(
            Address::from_label("s"),
            "Nguyen Van An",
            Address::from_label("i"),
            "IUH",
            course,
            "ipfs://x",
        );
        req.course_type = course_type.map(str::to_string);
        req.into_certificate(CertHash::new([0; 32]), issued_date)
    }

    #[test]
    fn empty_keyword_rejected() {
        assert_eq!(Keyword::parse(""), Err(RegistryError::EmptyKeyword));
    }

    #[test]
    fn substring_any_case() {
        let c = cert("Smart Contract Programming", None, 0);
        for kw in ["SMART", "contract", "Programming", "t c"] {
            assert!(Keyword::parse(kw).unwrap().matches_field(SearchField::CourseName, &c));
        }
        assert!(!Keyword::parse("python").unwrap().matches_field(SearchField::CourseName, &c));
        assert!(Keyword::parse("van").unwrap().matches_field(SearchField::StudentName, &c));
    }

    #[test]
    fn non_ascii_lowercase() {
        let kw = Keyword::parse("NGUYỄN").unwrap();
        assert!(kw.matches("Học viên Nguyễn Văn A"));
    }

    #[test]
    fn missing_optional_field_never_matches() {
        let kw = Keyword::parse("tech").unwrap();
        assert!(!kw.matches_field(SearchField::CourseType, &cert("X", None, 0)));
        assert!(kw.matches_field(SearchField::CourseType, &cert("X", Some("Technology"), 0)));
        assert!(!kw.matches_field(SearchField::CourseLevel, &cert("X", Some("Technology"), 0)));
    }

    #[test]
    fn date_range_inclusive() {
        let range = DateRange::new(10, 20);
        assert!(range.contains(&cert("a", None, 10)));
        assert!(range.contains(&cert("a", None, 20)));
        assert!(!range.contains(&cert("a", None, 9)));
        assert!(!range.contains(&cert("a", None, 21)));
        assert!(!DateRange::new(20, 10).contains(&cert("a", None, 15)));
    }
}
