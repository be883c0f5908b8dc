// # pork-ddns - One-shot Porkbun DDNS updater
//
// This binary is a THIN integration layer:
// - Reading configuration from environment variables
// - Installing the log subscriber
// - Building the runtime, the Porkbun provider and the reconciler
// - Mapping the run result to an exit code
//
// Reconciliation logic lives in pork-ddns-core; HTTP details live in
// pork-ddns-porkbun.
//
// ## Configuration
//
// ### Required
// - `API_KEY`: Porkbun API key
// - `SECRET_KEY`: Porkbun secret API key
// - `DOMAIN`: Registered domain (e.g. `example.com`)
//
// ### Optional
// - `SUBDOMAIN`: Single subdomain; absent or empty means the apex record
// - `SUBDOMAINS`: Comma-separated subdomains, overrides `SUBDOMAIN`
// - `TTL`: Record TTL in seconds (default 600)
// - `PORKBUN_API_BASE`: API base URL
// - `DDNS_MODE`: `dry-run` to log writes instead of sending them
// - `LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export API_KEY=pk1_...
// export SECRET_KEY=sk1_...
// export DOMAIN=example.com
// export SUBDOMAINS=home,vpn
//
// pork-ddns
// ```

use anyhow::{Context, Result};
use pork_ddns_core::{
    Credentials, DdnsConfig, DnsRecordStore, IpResolver, ReconcileEvent, Reconciler, RunReport,
    Target,
};
use pork_ddns_porkbun::PorkbunProvider;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible run results
///
/// - 0: Every target reconciled (created, updated or skipped)
/// - 1: Configuration error, nothing was sent
/// - 2: Runtime error (resolver, lookup, write, conflict or transport)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!(
        "Starting pork-ddns for {} ({} target(s))",
        config.domain,
        config.subdomains.len()
    );

    // Every request is awaited in sequence on this one thread
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_once(&config).await {
            Ok(report) => {
                info!(
                    "Run complete: {} target(s) reconciled against {}",
                    report.outcomes.len(),
                    report.ip
                );
                DdnsExitCode::Success
            }
            Err(e) => {
                error!("Run failed: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Map a validated `LOG_LEVEL` to a tracing level
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Run one reconciliation over every configured target
async fn run_once(config: &DdnsConfig) -> Result<RunReport> {
    let provider =
        PorkbunProvider::from_config(config).context("Failed to build Porkbun provider")?;

    let (result, _) = reconcile_and_log(
        Box::new(provider.clone()),
        &provider,
        &config.credentials(),
        &config.targets(),
    )
    .await;

    Ok(result?)
}

/// Events one run can emit: `IpResolved` plus one terminal event per target
fn event_capacity(targets: &[Target]) -> usize {
    targets.len() + 1
}

/// Reconcile `targets`, then log every reported event
///
/// The channel is sized so a run never fills it. Returns the run result
/// and the number of events logged.
async fn reconcile_and_log(
    store: Box<dyn DnsRecordStore>,
    resolver: &dyn IpResolver,
    credentials: &Credentials,
    targets: &[Target],
) -> (pork_ddns_core::Result<RunReport>, usize) {
    let (reconciler, mut events) = Reconciler::new(store, event_capacity(targets));
    let result = reconciler.run(resolver, credentials, targets).await;

    // Drop the sender so draining terminates
    drop(reconciler);
    let logged = log_events(&mut events).await;

    (result, logged)
}

/// Log one line per reported outcome, returning how many were logged
async fn log_events(events: &mut mpsc::Receiver<ReconcileEvent>) -> usize {
    let mut logged = 0;
    while let Some(event) = events.recv().await {
        logged += 1;
        match event {
            ReconcileEvent::IpResolved { ip } => {
                info!("Current public IP: {}", ip);
            }
            ReconcileEvent::RecordCreated { target, ip } => {
                info!("Created DNS record for {} with IP {}", target, ip);
            }
            ReconcileEvent::RecordUpdated {
                target,
                ip,
                previous,
            } => {
                info!(
                    "Updated DNS record for {} with IP {} (was {})",
                    target, ip, previous
                );
            }
            ReconcileEvent::RecordSkipped { target, ip } => {
                info!("DNS record for {} already set to {}, no update needed", target, ip);
            }
            ReconcileEvent::ReconcileFailed { target, error } => match target {
                Some(target) => error!("Failed to reconcile {}: {}", target, error),
                None => error!("Failed to resolve current IP: {}", error),
            },
        }
    }
    logged
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pork_ddns_core::DnsRecord;
    use std::net::Ipv4Addr;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DdnsExitCode::Success as u8, 0);
        assert_eq!(DdnsExitCode::ConfigError as u8, 1);
        assert_eq!(DdnsExitCode::RuntimeError as u8, 2);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("info"), Level::INFO);
    }

    /// Store with no records whose creates always succeed
    struct EmptyStore;

    #[async_trait]
    impl DnsRecordStore for EmptyStore {
        async fn get_dns_records(
            &self,
            _credentials: &Credentials,
            _target: &Target,
        ) -> pork_ddns_core::Result<Vec<DnsRecord>> {
            Ok(Vec::new())
        }

        async fn create_dns_record(
            &self,
            _credentials: &Credentials,
            _target: &Target,
            _ip: Ipv4Addr,
        ) -> pork_ddns_core::Result<()> {
            Ok(())
        }

        async fn update_dns_record(
            &self,
            _credentials: &Credentials,
            _target: &Target,
            _ip: Ipv4Addr,
        ) -> pork_ddns_core::Result<()> {
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "empty"
        }
    }

    struct FixedResolver(Ipv4Addr);

    #[async_trait]
    impl IpResolver for FixedResolver {
        async fn current_ip(&self, _credentials: &Credentials) -> pork_ddns_core::Result<Ipv4Addr> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_every_outcome_logged_for_many_targets() {
        let targets: Vec<Target> = (0..150)
            .map(|i| Target::new("example.com").with_subdomain(format!("host{}", i)))
            .collect();

        let (result, logged) = reconcile_and_log(
            Box::new(EmptyStore),
            &FixedResolver(Ipv4Addr::new(203, 0, 113, 7)),
            &Credentials::new("pk1_test", "sk1_test"),
            &targets,
        )
        .await;

        let report = result.expect("run succeeds");
        assert_eq!(report.outcomes.len(), 150);
        assert_eq!(logged, 151, "IpResolved plus one line per target");
    }

    #[test]
    fn test_event_capacity_covers_run() {
        assert_eq!(event_capacity(&[]), 1);
        let targets = vec![Target::new("example.com"); 3];
        assert_eq!(event_capacity(&targets), 4);
    }

    #[tokio::test]
    async fn test_log_events_drains_closed_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(ReconcileEvent::IpResolved {
            ip: Ipv4Addr::new(203, 0, 113, 7),
        })
        .await
        .unwrap();
        drop(tx);

        assert_eq!(log_events(&mut rx).await, 1);
        assert!(rx.recv().await.is_none());
    }
}
