// # DNS Record Store Trait
//
// Defines the interface for reading and writing address records via a
// provider API.
//
// ## Implementations
//
// - Porkbun: `pork-ddns-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use pork_ddns_core::{Credentials, DnsRecordStore, Target};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* DnsRecordStore implementation */;
//     let credentials = Credentials::new("pk1_...", "sk1_...");
//     let target = Target::new("example.com").with_subdomain("home");
//
//     let records = store.get_dns_records(&credentials, &target).await?;
//     if records.is_empty() {
//         store
//             .create_dns_record(&credentials, &target, "203.0.113.7".parse()?)
//             .await?;
//     }
//
//     Ok(())
// }
// ```

use crate::types::{Credentials, DnsRecord, Target};
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for DNS record store implementations
///
/// Implementations are the Record Reader and Record Writer of the system.
/// They carry no decision logic: whether to create, update or skip is
/// owned by the [`Reconciler`](crate::Reconciler).
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff
/// - ❌ Cache records between calls
/// - ❌ Decide whether a write is needed
/// - ❌ Log credentials
#[async_trait]
pub trait DnsRecordStore: Send + Sync {
    /// Look up existing address records for a target
    ///
    /// Scoped to the target's subdomain when present, otherwise to all
    /// address records of the bare domain.
    ///
    /// # Returns
    ///
    /// The records exactly as the provider listed them: zero, one or many.
    async fn get_dns_records(
        &self,
        credentials: &Credentials,
        target: &Target,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a new address record pointing at `ip`
    ///
    /// Always issues a write.
    async fn create_dns_record(
        &self,
        credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<(), crate::Error>;

    /// Point the existing address record at `ip`
    ///
    /// Always issues a write.
    async fn update_dns_record(
        &self,
        credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
