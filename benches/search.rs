use certificate_registry::{Address, CertificateRegistry, IssueRequest};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

const COURSES: [&str; 4] = [
    "Blockchain Development",
    "Smart Contract Programming",
    "Web Development",
    "Data Science",
];

fn populated(rt: &Runtime, count: usize) -> (CertificateRegistry, Address) {
    let owner = Address::from_label("owner");
    let registry = CertificateRegistry::deploy(owner);
    rt.block_on(async {
        for i in 0..count {
            let request = IssueRequest::new(
                Address::from_label(&format!("student-{}", i % 50)),
                format!("Student {}", i % 50),
                Address::from_label("issuer"),
                "IUH",
                COURSES[i % COURSES.len()],
                format!("ipfs://{}", i),
            )
            .with_course_details("Technology", "Beginner");
            registry.issue_certificate(owner, request).await.unwrap();
        }
    });
    (registry, owner)
}

fn keyword_scan(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("admin_search_by_course");

    for count in [100usize, 1_000, 10_000] {
        let (registry, owner) = populated(&rt, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.to_async(&rt)
                .iter(|| async { registry.admin_search_by_course(owner, "development").await.unwrap() });
        });
    }
    group.finish();
}

fn student_scan(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (registry, _) = populated(&rt, 5_000);
    let student = Address::from_label("student-7");

    c.bench_function("student_certificates_5000", |b| {
        b.to_async(&rt)
            .iter(|| async { registry.student_certificates(student).await });
    });
}

criterion_group!(benches, keyword_scan, student_scan);
criterion_main!(benches);
