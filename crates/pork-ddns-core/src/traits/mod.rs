//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that provider implementations must follow.
//!
//! - [`IpResolver`]: Discover the current public IP
//! - [`DnsRecordStore`]: Read and write address records via provider APIs

pub mod ip_resolver;
pub mod record_store;

pub use ip_resolver::IpResolver;
pub use record_store::DnsRecordStore;
