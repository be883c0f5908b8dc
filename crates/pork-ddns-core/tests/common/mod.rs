//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles keep their counters behind `Arc`s so a test can hand one
//! copy to the reconciler and keep another for assertions.

#![allow(dead_code)]

use pork_ddns_core::error::{Error, Result};
use pork_ddns_core::{Credentials, DnsRecord, DnsRecordStore, IpResolver, Target};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A write observed by the mock store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Create { target: Target, ip: Ipv4Addr },
    Update { target: Target, ip: Ipv4Addr },
}

/// An in-memory record store that behaves like the provider
///
/// Creates append a record, updates rewrite the content of every record
/// of the target. Lookups return the target's records.
pub struct MockRecordStore {
    records: Arc<Mutex<Vec<(Target, DnsRecord)>>>,
    get_call_count: Arc<AtomicUsize>,
    writes: Arc<Mutex<Vec<Write>>>,
    fail_writes: bool,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            get_call_count: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(Mutex::new(Vec::new())),
            fail_writes: false,
        }
    }

    /// A store whose writes fail with a provider error
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Seed an existing record for a target
    pub fn with_record(self, target: &Target, content: &str) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            let id = (records.len() + 1).to_string();
            records.push((target.clone(), DnsRecord::new(id, target.fqdn(), content)));
        }
        self
    }

    /// Create a new MockRecordStore that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            get_call_count: Arc::clone(&other.get_call_count),
            writes: Arc::clone(&other.writes),
            fail_writes: other.fail_writes,
        }
    }

    /// Number of get_dns_records() calls
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Every write issued, in order
    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of writes issued
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Current records of a target
    pub fn records_for(&self, target: &Target) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t.domain == target.domain && t.subdomain == target.subdomain)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl DnsRecordStore for MockRecordStore {
    async fn get_dns_records(
        &self,
        _credentials: &Credentials,
        target: &Target,
    ) -> Result<Vec<DnsRecord>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.records_for(target))
    }

    async fn create_dns_record(
        &self,
        _credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<()> {
        self.writes.lock().unwrap().push(Write::Create {
            target: target.clone(),
            ip,
        });
        if self.fail_writes {
            return Err(Error::provider("mock", 500, "Failed to create DNS record", "{}"));
        }

        let mut records = self.records.lock().unwrap();
        let id = (records.len() + 1).to_string();
        records.push((
            target.clone(),
            DnsRecord::new(id, target.fqdn(), ip.to_string()),
        ));
        Ok(())
    }

    async fn update_dns_record(
        &self,
        _credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<()> {
        self.writes.lock().unwrap().push(Write::Update {
            target: target.clone(),
            ip,
        });
        if self.fail_writes {
            return Err(Error::provider("mock", 500, "Failed to update DNS record", "{}"));
        }

        for (t, record) in self.records.lock().unwrap().iter_mut() {
            if t.domain == target.domain && t.subdomain == target.subdomain {
                record.content = ip.to_string();
            }
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A resolver that always answers with the same IP
pub struct StaticIpResolver {
    ip: Ipv4Addr,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpResolver {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for StaticIpResolver {
    async fn current_ip(&self, _credentials: &Credentials) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }
}

/// A resolver whose provider answers with HTTP 500
pub struct FailingIpResolver;

#[async_trait::async_trait]
impl IpResolver for FailingIpResolver {
    async fn current_ip(&self, _credentials: &Credentials) -> Result<Ipv4Addr> {
        Err(Error::provider(
            "mock",
            500,
            "Failed to get current IP",
            "Internal Server Error",
        ))
    }
}

/// Credentials used by every contract test
pub fn test_credentials() -> Credentials {
    Credentials::new("pk1_test", "sk1_test")
}

/// The `home.example.com` target
pub fn home_target() -> Target {
    Target::new("example.com").with_subdomain("home")
}
