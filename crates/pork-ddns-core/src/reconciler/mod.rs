//! Record reconciliation
//!
//! The Reconciler is responsible for:
//! - Resolving the current public IP (once per run)
//! - Reading the existing address records of each target
//! - Deciding between create, update and skip
//! - Reporting one event per terminal outcome
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ IpResolver  │─── Ipv4Addr ────────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │  Reconciler  │
//!                            └──────────────┘
//!                                     │
//!                   ┌─────────────────┴─────────────────┐
//!                   │                                   │
//!                   ▼                                   ▼
//!          ┌────────────────┐                  ┌─────────────┐
//!          │ DnsRecordStore │                  │   Events    │
//!          │ (read / write) │                  │  (report)   │
//!          └────────────────┘                  └─────────────┘
//! ```
//!
//! ## Decision Policy
//!
//! 1. More than one record ⇒ [`Error::Conflict`], nothing is written
//! 2. No record ⇒ create
//! 3. One record with the current IP ⇒ skip
//! 4. One record with another IP ⇒ update
//!
//! Nothing is retried and nothing is rolled back: a failed write leaves
//! provider state as the provider left it.

use crate::error::{Error, Result};
use crate::traits::{DnsRecordStore, IpResolver};
use crate::types::{Credentials, Target};
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Result of reconciling one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// No record existed; one was created
    Created {
        /// The IP address written
        ip: Ipv4Addr,
    },
    /// The single existing record pointed elsewhere and was updated
    Updated {
        /// The record content before the update
        previous: String,
        /// The IP address written
        ip: Ipv4Addr,
    },
    /// The single existing record already had the current IP (no-op)
    Skipped {
        /// The current IP address
        ip: Ipv4Addr,
    },
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Current public IP resolved
    IpResolved { ip: Ipv4Addr },

    /// Record created
    RecordCreated { target: String, ip: Ipv4Addr },

    /// Record updated
    RecordUpdated {
        target: String,
        ip: Ipv4Addr,
        previous: String,
    },

    /// Record already up to date
    RecordSkipped { target: String, ip: Ipv4Addr },

    /// Run aborted; `target` is `None` when IP resolution failed
    ReconcileFailed {
        target: Option<String>,
        error: String,
    },
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The IP the run reconciled against
    pub ip: Ipv4Addr,
    /// One outcome per target, in target order
    pub outcomes: Vec<(Target, ReconciliationOutcome)>,
}

/// Record reconciler
///
/// Drives the read-decide-write cycle against a [`DnsRecordStore`].
/// Every call runs sequentially on the caller's task; no requests are
/// issued concurrently.
///
/// ## Reporting
///
/// Outcomes are reported over the bounded channel returned by
/// [`Reconciler::new()`]. When the channel is full, events are dropped
/// with a warning rather than blocking the run.
pub struct Reconciler {
    /// Record reader and writer
    store: Box<dyn DnsRecordStore>,

    /// Event sender for outcome reporting
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `store`: Record store implementation
    /// - `event_capacity`: Capacity of the event channel (at least 1)
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver)
    pub fn new(
        store: Box<dyn DnsRecordStore>,
        event_capacity: usize,
    ) -> (Self, mpsc::Receiver<ReconcileEvent>) {
        let (tx, rx) = mpsc::channel(event_capacity.max(1));
        (Self { store, event_tx: tx }, rx)
    }

    /// Resolve the current IP once, then reconcile every target in order
    ///
    /// The first failure aborts the run. If IP resolution fails, no
    /// record is fetched at all.
    pub async fn run(
        &self,
        resolver: &dyn IpResolver,
        credentials: &Credentials,
        targets: &[Target],
    ) -> Result<RunReport> {
        let ip = match resolver.current_ip(credentials).await {
            Ok(ip) => ip,
            Err(e) => {
                self.emit_event(ReconcileEvent::ReconcileFailed {
                    target: None,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        debug!("Current IP: {}", ip);
        self.emit_event(ReconcileEvent::IpResolved { ip });

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let outcome = self.upsert_dns_record(credentials, target, ip).await?;
            outcomes.push((target.clone(), outcome));
        }

        Ok(RunReport { ip, outcomes })
    }

    /// Create or update the target's address record so it points at `ip`
    pub async fn upsert_dns_record(
        &self,
        credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<ReconciliationOutcome> {
        match self.reconcile(credentials, target, ip).await {
            Ok(outcome) => {
                self.emit_event(match &outcome {
                    ReconciliationOutcome::Created { ip } => ReconcileEvent::RecordCreated {
                        target: target.fqdn(),
                        ip: *ip,
                    },
                    ReconciliationOutcome::Updated { previous, ip } => {
                        ReconcileEvent::RecordUpdated {
                            target: target.fqdn(),
                            ip: *ip,
                            previous: previous.clone(),
                        }
                    }
                    ReconciliationOutcome::Skipped { ip } => ReconcileEvent::RecordSkipped {
                        target: target.fqdn(),
                        ip: *ip,
                    },
                });
                Ok(outcome)
            }
            Err(e) => {
                self.emit_event(ReconcileEvent::ReconcileFailed {
                    target: Some(target.fqdn()),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Apply the decision policy for a single target
    async fn reconcile(
        &self,
        credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<ReconciliationOutcome> {
        let mut records = self.store.get_dns_records(credentials, target).await?;
        debug!(
            "Found {} address record(s) for {} via {}",
            records.len(),
            target,
            self.store.provider_name()
        );

        if records.len() > 1 {
            return Err(Error::conflict(target.fqdn(), records));
        }

        let Some(existing) = records.pop() else {
            debug!("No record for {}, creating", target);
            self.store
                .create_dns_record(credentials, target, ip)
                .await?;
            return Ok(ReconciliationOutcome::Created { ip });
        };

        if content_matches(&existing.content, ip) {
            debug!("Record {} already has IP {}, skipping update", target, ip);
            return Ok(ReconciliationOutcome::Skipped { ip });
        }

        debug!("Record {} drifted ({} -> {}), updating", target, existing.content, ip);
        self.store
            .update_dns_record(credentials, target, ip)
            .await?;
        Ok(ReconciliationOutcome::Updated {
            previous: existing.content,
            ip,
        })
    }

    /// Emit a reconcile event
    fn emit_event(&self, event: ReconcileEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing the event capacity.");
        }
    }
}

/// Record content equals the IP, ignoring surrounding whitespace
fn content_matches(content: &str, ip: Ipv4Addr) -> bool {
    content.trim().parse::<Ipv4Addr>().is_ok_and(|current| current == ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DnsRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store holding a fixed record list, logging every write
    struct FixedStore {
        records: Vec<DnsRecord>,
        writes: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl DnsRecordStore for FixedStore {
        async fn get_dns_records(
            &self,
            _credentials: &Credentials,
            _target: &Target,
        ) -> Result<Vec<DnsRecord>> {
            Ok(self.records.clone())
        }

        async fn create_dns_record(
            &self,
            _credentials: &Credentials,
            _target: &Target,
            _ip: Ipv4Addr,
        ) -> Result<()> {
            self.writes.lock().unwrap().push("create");
            Ok(())
        }

        async fn update_dns_record(
            &self,
            _credentials: &Credentials,
            _target: &Target,
            _ip: Ipv4Addr,
        ) -> Result<()> {
            self.writes.lock().unwrap().push("update");
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn reconciler_with(records: Vec<DnsRecord>) -> (Reconciler, mpsc::Receiver<ReconcileEvent>) {
        Reconciler::new(
            Box::new(FixedStore {
                records,
                writes: Mutex::new(Vec::new()),
            }),
            8,
        )
    }

    #[test]
    fn test_content_matches() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        assert!(content_matches("1.2.3.4", ip));
        assert!(content_matches(" 1.2.3.4\n", ip));
        assert!(!content_matches("1.2.3.5", ip));
        assert!(!content_matches("not-an-ip", ip));
    }

    #[test]
    fn test_skip_emits_event() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        let (reconciler, mut rx) =
            reconciler_with(vec![DnsRecord::new("1", "example.com", "1.2.3.4")]);
        let target = Target::new("example.com");
        let creds = Credentials::new("pk", "sk");

        let outcome =
            tokio_test::block_on(reconciler.upsert_dns_record(&creds, &target, ip)).unwrap();
        assert_eq!(outcome, ReconciliationOutcome::Skipped { ip });
        assert_eq!(
            rx.try_recv().unwrap(),
            ReconcileEvent::RecordSkipped {
                target: "example.com".to_string(),
                ip
            }
        );
    }

    #[test]
    fn test_full_channel_does_not_block() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        let (reconciler, _rx) = Reconciler::new(
            Box::new(FixedStore {
                records: Vec::new(),
                writes: Mutex::new(Vec::new()),
            }),
            0,
        );
        let target = Target::new("example.com");
        let creds = Credentials::new("pk", "sk");

        for _ in 0..3 {
            let outcome =
                tokio_test::block_on(reconciler.upsert_dns_record(&creds, &target, ip)).unwrap();
            assert_eq!(outcome, ReconciliationOutcome::Created { ip });
        }
    }
}
