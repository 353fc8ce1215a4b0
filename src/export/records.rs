use crate::registry::{Certificate, QueryResult};
use chrono::SecondsFormat;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 10] = [
    "cert_hash",
    "student",
    "student_name",
    "issuer",
    "issuer_name",
    "course_name",
    "course_type",
    "course_level",
    "metadata_uri",
    "issued_date",
];

fn row(cert: &Certificate) -> [String; 10] {
    let issued = cert
        .issued_at()
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| cert.issued_date.to_string());

    [
        cert.cert_hash.to_string(),
        cert.student.to_string(),
        cert.student_name.clone(),
        cert.issuer.to_string(),
        cert.issuer_name.clone(),
        cert.course_name.clone(),
        cert.course_type.clone().unwrap_or_default(),
        cert.course_level.clone().unwrap_or_default(),
        cert.metadata_uri.clone(),
        issued,
    ]
}

pub fn write_records<W: Write>(writer: W, result: &QueryResult) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for cert in result.certificates() {
        wtr.write_record(row(cert))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, result: &QueryResult) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_records(file, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Address;
    use crate::registry::{CertHash, IssueRequest};

    #[test]
    fn one_row_per_certificate() {
        let cert = IssueRequest::new(
            Address::from_label("s"),
            "Tran Thi B, Jr.",
            Address::from_label("i"),
            "IUH",
            "Web Development",
            "ipfs://3",
        )
        .with_course_details("Technology", "Advanced")
        .into_certificate(CertHash::new([3; 32]), 0);

        let mut out = Vec::new();
        write_records(&mut out, &QueryResult::from(vec![cert])).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("cert_hash,student,"));
        assert!(lines[1].contains("\"Tran Thi B, Jr.\""));
        assert!(lines[1].ends_with("1970-01-01T00:00:00Z"));
    }
}
