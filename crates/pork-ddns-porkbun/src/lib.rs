// # Porkbun DNS Provider
//
// This crate provides the Porkbun implementation of the IP resolver and the
// record store for the pork-ddns updater.
//
// ## Behavior
//
// - ✅ One HTTP request per operation
// - ✅ Full error propagation (the caller decides what a failure means)
// - ✅ Explicit response shape validation (no panics on malformed bodies)
// - ✅ Dry-run mode for safe testing
// - ✅ Requests sent over IPv4, so `ping` reports the address for the `A` record
// - ❌ NO retry logic
// - ❌ NO caching between calls
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API keys NEVER appear in logs
// - API keys are sent in the JSON body of each request, never in URLs
//
// ## API Reference
//
// - Porkbun API v3: https://porkbun.com/api/json/v3/documentation
// - Ping: POST `/ping`
// - Retrieve records: POST `/dns/retrieveByNameType/:domain/A/:subdomain`
// - Edit records: POST `/dns/editByNameType/:domain/A/:subdomain`
// - Create record: POST `/dns/create/:domain`

pub mod transport;

use async_trait::async_trait;
use pork_ddns_core::types::ADDRESS_RECORD_TYPE;
use pork_ddns_core::{
    Credentials, DdnsConfig, DnsRecord, DnsRecordStore, Error, IpResolver, Result, Target,
};
use serde::Serialize;
use serde_json::Map;
use std::net::{IpAddr, Ipv4Addr};

pub use transport::{ApiResponse, ResponseBody, Transport, assemble_payload};

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "porkbun";

/// Body of the create and edit endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordBody {
    /// Record type; only sent on create
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<&'static str>,

    /// Subdomain; only sent on create, omitted for the apex record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The IP address
    pub content: String,

    /// Time-to-live in seconds, as a string like the API documents it
    pub ttl: String,
}

impl RecordBody {
    /// Body for `dns/create`
    pub fn create(target: &Target, ip: Ipv4Addr) -> Self {
        Self {
            record_type: Some(ADDRESS_RECORD_TYPE),
            name: target.subdomain.clone(),
            content: ip.to_string(),
            ttl: target.ttl.to_string(),
        }
    }

    /// Body for `dns/editByNameType`
    pub fn update(target: &Target, ip: Ipv4Addr) -> Self {
        Self {
            record_type: None,
            name: None,
            content: ip.to_string(),
            ttl: target.ttl.to_string(),
        }
    }
}

/// Path of the name-and-type scoped endpoints
///
/// `dns/<action>/<domain>/A/<subdomain>`, or `dns/<action>/<domain>/A/`
/// for the apex record.
pub fn name_type_path(action: &str, target: &Target) -> String {
    format!(
        "dns/{}/{}/{}/{}",
        action,
        target.domain,
        ADDRESS_RECORD_TYPE,
        target.subdomain.as_deref().unwrap_or("")
    )
}

/// Path of the create endpoint
pub fn create_path(target: &Target) -> String {
    format!("dns/create/{}", target.domain)
}

/// Porkbun DNS provider
///
/// Stateless and single-shot: every call is one POST. Credentials are not
/// stored; they are passed into each operation.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all lookups (ping, record retrieval)
/// - Log the intended write path and body (credentials excluded)
/// - **NOT** actually create or edit records
#[derive(Debug, Clone)]
pub struct PorkbunProvider {
    /// Transport bound to the API base URL
    transport: Transport,

    /// Dry-run mode: if true, perform reads but skip writes
    dry_run: bool,
}

impl PorkbunProvider {
    /// Create a new Porkbun provider
    ///
    /// # Parameters
    ///
    /// - `api_base`: API base URL (e.g., `https://api.porkbun.com/api/json/v3/`)
    /// - `dry_run`: If true, perform reads but skip writes
    pub fn new(api_base: impl Into<String>, dry_run: bool) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(api_base)?,
            dry_run,
        })
    }

    /// Create a provider in live mode
    pub fn new_live(api_base: impl Into<String>) -> Result<Self> {
        Self::new(api_base, false)
    }

    /// Create a provider in dry-run mode
    pub fn new_dry_run(api_base: impl Into<String>) -> Result<Self> {
        Self::new(api_base, true)
    }

    /// Create a provider from the updater configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        if config.is_dry_run() {
            tracing::warn!("Porkbun provider running in DRY-RUN mode - no changes will be made");
        }
        Self::new(config.api_base.clone(), config.is_dry_run())
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send a create/edit call, or only log it in dry-run mode
    async fn write(
        &self,
        credentials: &Credentials,
        path: &str,
        body: &RecordBody,
        failure: &str,
    ) -> Result<()> {
        let fields = transport::to_body(body)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST to {} with payload: {}",
                path,
                serde_json::Value::Object(fields)
            );
            return Ok(());
        }

        let response = self.transport.post(path, credentials, fields).await?;
        ensure_success(&response, failure)
    }
}

/// Require HTTP 200 and `"status": "SUCCESS"`
fn ensure_success(response: &ApiResponse, failure: &str) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(provider_error(response, failure))
    }
}

/// Build a provider error from a response
///
/// Adds the provider's own `message` field, or a hint for well-known
/// status codes, to the failure description.
fn provider_error(response: &ApiResponse, failure: &str) -> Error {
    let detail = match (response.str_field("message"), response.status) {
        (Some(message), _) => format!("{}: {}", failure, message),
        (None, 401 | 403) => format!("{}: authentication failed", failure),
        (None, 429) => format!("{}: rate limit exceeded", failure),
        (None, 500..=599) => format!("{}: provider server error (transient)", failure),
        (None, _) => failure.to_string(),
    };
    Error::provider(PROVIDER_NAME, response.status, detail, response.raw())
}

#[async_trait]
impl IpResolver for PorkbunProvider {
    /// Ask Porkbun which address the request came from
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /ping
    /// { "apikey": "...", "secretapikey": "..." }
    ///
    /// 200 { "status": "SUCCESS", "yourIp": "203.0.113.7" }
    /// ```
    async fn current_ip(&self, credentials: &Credentials) -> Result<Ipv4Addr> {
        const FAILURE: &str = "Failed to get current IP";

        let response = self.transport.post("ping", credentials, Map::new()).await?;
        if !response.is_ok() {
            return Err(provider_error(&response, FAILURE));
        }

        let raw_ip = response.str_field("yourIp").ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                response.status,
                format!("{}: response has no yourIp field", FAILURE),
                response.raw(),
            )
        })?;

        match raw_ip.trim().parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => Ok(ip),
            Ok(IpAddr::V6(ip)) => Err(Error::provider(
                PROVIDER_NAME,
                response.status,
                format!("{}: expected an IPv4 address, got {}", FAILURE, ip),
                response.raw(),
            )),
            Err(_) => Err(Error::provider(
                PROVIDER_NAME,
                response.status,
                format!("{}: invalid IP address {:?}", FAILURE, raw_ip),
                response.raw(),
            )),
        }
    }
}

#[async_trait]
impl DnsRecordStore for PorkbunProvider {
    async fn get_dns_records(
        &self,
        credentials: &Credentials,
        target: &Target,
    ) -> Result<Vec<DnsRecord>> {
        const FAILURE: &str = "Failed to fetch existing DNS record";

        let path = name_type_path("retrieveByNameType", target);
        let response = self.transport.post(&path, credentials, Map::new()).await?;
        if !response.is_success() {
            return Err(provider_error(&response, FAILURE));
        }

        let malformed = |why: &str| {
            Error::provider(
                PROVIDER_NAME,
                response.status,
                format!("{}: {}", FAILURE, why),
                response.raw(),
            )
        };

        let records = response
            .json()
            .map(|v| &v["records"])
            .filter(|v| v.is_array())
            .ok_or_else(|| malformed("response has no records array"))?;

        let records: Vec<DnsRecord> = serde_json::from_value(records.clone())
            .map_err(|e| malformed(&format!("malformed record: {}", e)))?;

        tracing::debug!("Porkbun returned {} record(s) for {}", records.len(), target);
        Ok(records)
    }

    async fn create_dns_record(
        &self,
        credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<()> {
        tracing::debug!("Creating DNS record {} -> {}", target, ip);
        self.write(
            credentials,
            &create_path(target),
            &RecordBody::create(target, ip),
            "Failed to create DNS record",
        )
        .await
    }

    async fn update_dns_record(
        &self,
        credentials: &Credentials,
        target: &Target,
        ip: Ipv4Addr,
    ) -> Result<()> {
        tracing::debug!("Updating DNS record {} -> {}", target, ip);
        self.write(
            credentials,
            &name_type_path("editByNameType", target),
            &RecordBody::update(target, ip),
            "Failed to update existing DNS record",
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
