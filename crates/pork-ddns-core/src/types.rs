//! Data model shared by the reconciler and provider implementations

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// DNS record type managed by this system
pub const ADDRESS_RECORD_TYPE: &str = "A";

/// Default time-to-live for created and updated records (seconds)
pub const DEFAULT_TTL: u32 = 600;

/// API credential pair sent with every provider request
///
/// # Security
///
/// The Debug implementation does NOT expose either key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret_key: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The API key
    /// ⚠️ NEVER log this value
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The secret API key
    /// ⚠️ NEVER log this value
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<REDACTED>")
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

/// The DNS name being managed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Registered domain (e.g., "example.com")
    pub domain: String,

    /// Subdomain label(s); `None` targets the apex record
    pub subdomain: Option<String>,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl Target {
    /// Create a target for the apex record of `domain`
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomain: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the subdomain. An empty string targets the apex.
    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        let subdomain = subdomain.into();
        self.subdomain = if subdomain.is_empty() {
            None
        } else {
            Some(subdomain)
        };
        self
    }

    /// Set the time-to-live
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fully qualified name, for logging
    pub fn fqdn(&self) -> String {
        match &self.subdomain {
            Some(sub) => format!("{}.{}", sub, self.domain),
            None => self.domain.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn())
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// An address record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider record ID
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    /// Fully qualified record name
    #[serde(default)]
    pub name: String,

    /// Record type, always "A" for records this system reads
    #[serde(rename = "type", default)]
    pub record_type: String,

    /// Record content: the IP address
    pub content: String,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub ttl: Option<String>,

    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub prio: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl DnsRecord {
    /// Create an address record with the given ID, name and content
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type: ADDRESS_RECORD_TYPE.to_string(),
            content: content.into(),
            ttl: None,
            prio: None,
            notes: None,
        }
    }
}

// Porkbun sends numeric fields as strings, but not consistently.
fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_string_or_number(deserializer).map(Option::unwrap_or_default)
}
