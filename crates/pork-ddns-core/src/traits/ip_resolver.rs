// # IP Resolver Trait
//
// Defines the interface for discovering the caller's current public IPv4
// address.
//
// ## Implementations
//
// - Porkbun `ping` endpoint: `pork-ddns-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use pork_ddns_core::{Credentials, IpResolver};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//     let credentials = Credentials::new("pk1_...", "sk1_...");
//
//     let ip = resolver.current_ip(&credentials).await?;
//     println!("Public IP: {}", ip);
//
//     Ok(())
// }
// ```

use crate::types::Credentials;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP resolver implementations
///
/// A resolver is asked exactly once per run. It must not cache the answer
/// between calls: every call re-fetches the address as currently observed.
///
/// # Allowed Capabilities
/// - ✅ One HTTP call per invocation
/// - ✅ Validate the response shape
///
/// # Forbidden Capabilities
/// - ❌ Retry or back off (failures propagate to the caller)
/// - ❌ Touch DNS records
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address the provider sees requests coming from
    /// - `Err(Error::Provider)`: Non-success status or malformed response
    /// - `Err(Error::Http)`: Transport failure
    async fn current_ip(&self, credentials: &Credentials) -> Result<Ipv4Addr, crate::Error>;
}
