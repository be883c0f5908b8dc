// # pork-ddns-core
//
// Core library for the single-shot Porkbun DDNS updater.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic for keeping an address
// record in line with the current public IP:
// - **IpResolver**: Trait for discovering the current public IP
// - **DnsRecordStore**: Trait for reading and writing records via provider APIs
// - **Reconciler**: Orchestrates resolve → read → create/update/skip
// - **DdnsConfig**: Environment-driven configuration
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic is separate from provider I/O
// 2. **Single-Shot**: One run, one IP lookup, no state between runs
// 3. **Fail Fast**: Every error aborts the run; retry belongs to the scheduler
// 4. **Idempotency**: A record already holding the current IP is never rewritten

pub mod config;
pub mod error;
pub mod reconciler;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use config::{DdnsConfig, RunMode};
pub use error::{Error, Result};
pub use reconciler::{ReconcileEvent, ReconciliationOutcome, Reconciler, RunReport};
pub use traits::{DnsRecordStore, IpResolver};
pub use types::{Credentials, DnsRecord, Target};
