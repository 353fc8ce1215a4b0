use anyhow::{Context, Result};
use certificate_registry::config::{GatewayConfig, RegistryConfig};
use certificate_registry::export::write_csv;
use certificate_registry::network::{LedgerGateway, SimulatedGateway};
use certificate_registry::{Address, CertificateRegistry, IssueRequest, RegistryEvent, Role};
use log::warn;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

const COURSES: [(&str, &str, &str); 6] = [
    ("Blockchain Development", "Technology", "Intermediate"),
    ("Smart Contract Programming", "Technology", "Advanced"),
    ("Web Development", "Technology", "Beginner"),
    ("Business Management", "Business", "Intermediate"),
    ("Marketing Strategy", "Business", "Beginner"),
    ("Data Science", "Technology", "Advanced"),
];

const STUDENTS: [&str; 4] = ["Nguyen Van An", "Tran Thi Binh", "Le Van Cuong", "Nguyen Thi Dung"];

pub struct RegistrySystem {
    pub registry: Arc<CertificateRegistry>,
    pub operator: Address,
    pub issuer: Address,
    pub students: Vec<(Address, String)>,
    pub gateway: Option<Arc<SimulatedGateway>>,
    start_time: Instant,
}

impl RegistrySystem {
    pub async fn new(config: &RegistryConfig) -> Result<Self> {
        let mut registry = CertificateRegistry::from_config(config).await?;

        let gateway = match &config.gateway {
            Some(GatewayConfig {
                channel,
                contract,
                submit_latency_ms,
            }) => {
                let gw = Arc::new(SimulatedGateway::new(
                    channel.clone(),
                    contract.clone(),
                    Duration::from_millis(*submit_latency_ms),
                ));
                if let Err(e) = gw.connect().await {
                    warn!("gateway unavailable, continuing without it: {}", e);
                }
                registry = registry.with_gateway(gw.clone());
                Some(gw)
            }
            None => None,
        };

        let operator = Address::from_label("operator");
        registry
            .grant_role(config.deployer, Role::admin(), operator)
            .await?;

        let students = STUDENTS
            .iter()
            .map(|name| (Address::from_label(name), name.to_string()))
            .collect();

        Ok(Self {
            registry: Arc::new(registry),
            operator,
            issuer: Address::from_label("IUH University"),
            students,
            gateway,
            start_time: Instant::now(),
        })
    }

    /// Issues `count` certificates concurrently and returns certificates per second.
    pub async fn benchmark_issuance(&self, count: usize) -> Result<f64> {
        let start = Instant::now();
        let mut handles = Vec::with_capacity(count);

        for i in 0..count {
            let registry = self.registry.clone();
            let operator = self.operator;
            let (student, student_name) = self.students[i % self.students.len()].clone();
            let (course, course_type, course_level) = COURSES[i % COURSES.len()];
            let request = IssueRequest::new(
                student,
                student_name,
                self.issuer,
                "IUH University",
                course,
                format!("ipfs://certificate-{}", i),
            )
            .with_course_details(course_type, course_level);

            handles.push(tokio::spawn(async move {
                registry.issue_certificate(operator, request).await
            }));
        }

        for handle in handles {
            handle.await.context("issuance task panicked")??;
        }

        Ok(count as f64 / start.elapsed().as_secs_f64())
    }

    pub async fn run_queries(&self) -> Result<()> {
        let (student, name) = &self.students[0];

        let own = self.registry.student_certificates(*student).await;
        println!("  → {} holds {} certificate(s)", name, own.total());

        let dev = self
            .registry
            .student_certificates_by_course_name(*student, "development")
            .await?;
        println!("  → \"development\" in {}'s courses: {}", name, dev.total());

        let tech = self
            .registry
            .admin_search_by_course_type(self.operator, "technology")
            .await?;
        println!("  → Technology certificates (all students): {}", tech.total());

        let by_name = self
            .registry
            .admin_search_by_student_name(self.operator, "nguyen")
            .await?;
        println!("  → Students matching \"nguyen\": {}", by_name.total());

        match self
            .registry
            .admin_search_by_course(*student, "Blockchain")
            .await
        {
            Err(e) => println!("  → Non-admin admin search rejected: {}", e),
            Ok(_) => warn!("non-admin admin search unexpectedly succeeded"),
        }

        if let Some(cert) = own.certificates().first() {
            let (other, _) = &self.students[1];
            if let Err(e) = self
                .registry
                .student_certificate_by_hash(*other, &cert.cert_hash)
                .await
            {
                println!("  → Cross-student hash lookup rejected: {}", e);
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║          Course Certificate Registry                  ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let mut config = RegistryConfig::resolve(config_path.as_deref())
        .context("failed to load registry configuration")?;
    if config.gateway.is_none() {
        config.gateway = Some(GatewayConfig {
            channel: "certificates".to_string(),
            contract: "certificate_registry".to_string(),
            submit_latency_ms: 1,
        });
    }

    let system = RegistrySystem::new(&config).await?;
    let mut events = system.registry.subscribe();
    println!("✓ Registry deployed by {}\n", config.deployer);

    println!("[1/4] Issuing certificates...");
    let rate = system.benchmark_issuance(200).await?;
    println!("      ✓ {:.2} certs/sec\n", rate);

    let mut issued = 0usize;
    while let Ok(event) = events.try_recv() {
        if matches!(event, RegistryEvent::CertificateIssued { .. }) {
            issued += 1;
        }
    }
    println!("      ✓ {} issuance event(s) observed\n", issued);

    println!("[2/4] Running queries...");
    system.run_queries().await?;
    println!();

    println!("[3/4] Verifying journal...");
    let journal = system.registry.journal();
    let bad = journal.verify_all().await;
    println!(
        "      ✓ {} entries, {} signature(s) issued, {} bad",
        journal.len().await,
        journal.signer().signatures_issued(),
        bad.len()
    );
    if let Some(gw) = &system.gateway {
        println!("      ✓ {} submission(s) mirrored to gateway", gw.submissions().await.len());
    }
    println!();

    println!("[4/4] Exporting...");
    let all = system.registry.all_certificates(system.operator).await?;
    write_csv(&config.export_path, &all)
        .with_context(|| format!("failed to write {}", config.export_path.display()))?;
    println!("      ✓ {} certificate(s) written to {}", all.total(), config.export_path.display());

    let snapshot_path = config.export_path.with_extension("snap");
    system.registry.save_snapshot(&snapshot_path).await?;
    println!("      ✓ Snapshot saved to {}", snapshot_path.display());

    let restored = CertificateRegistry::load_snapshot(config.deployer, &snapshot_path).await?;
    let reloaded = restored.all_certificates(config.deployer).await?;
    let reloaded_total = reloaded.total();
    let holders: HashSet<Address> = reloaded
        .into_certificates()
        .into_iter()
        .map(|cert| cert.student)
        .collect();
    println!(
        "      ✓ Snapshot reloaded: {} certificate(s) across {} student(s)",
        reloaded_total,
        holders.len()
    );

    println!(
        "\nDone in {:.2}s.",
        system.start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
