//! Configuration for the DDNS updater
//!
//! All configuration comes from environment variables:
//!
//! - `API_KEY`, `SECRET_KEY`, `DOMAIN`: required
//! - `SUBDOMAIN`: single subdomain (absent or empty = apex)
//! - `SUBDOMAINS`: comma-separated subdomains, overrides `SUBDOMAIN`
//! - `TTL`: record time-to-live in seconds (default 600)
//! - `PORKBUN_API_BASE`: API base URL
//! - `DDNS_MODE`: `dry-run` to skip writes
//! - `LOG_LEVEL`: trace, debug, info, warn, error

use crate::error::{Error, Result};
use crate::types::{Credentials, DEFAULT_TTL, Target};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Porkbun JSON API base URL
pub const DEFAULT_API_BASE: &str = "https://api.porkbun.com/api/json/v3/";

/// Main DDNS configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Porkbun API key
    /// ⚠️ NEVER log this value
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Porkbun secret API key
    /// ⚠️ NEVER log this value
    #[serde(skip_serializing)]
    pub secret_key: String,

    /// Registered domain
    pub domain: String,

    /// Subdomains to manage; an empty entry is the apex record
    #[serde(default = "default_subdomains")]
    pub subdomains: Vec<String>,

    /// Record time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Provider API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Live or dry-run
    #[serde(default)]
    pub mode: RunMode,

    /// Log level name
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Whether record writes are sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Writes are sent to the provider
    #[default]
    Live,
    /// Reads happen, writes are only logged
    DryRun,
}

// Custom Debug implementation that hides the API keys
impl fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("api_key", &"<REDACTED>")
            .field("secret_key", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("subdomains", &self.subdomains)
            .field("ttl", &self.ttl)
            .field("api_base", &self.api_base)
            .field("mode", &self.mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl DdnsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Missing required variables are reported together, before anything
    /// else is parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("API_KEY");
        let secret_key = non_empty("SECRET_KEY");
        let domain = non_empty("DOMAIN");

        let (api_key, secret_key, domain) = match (api_key, secret_key, domain) {
            (Some(a), Some(s), Some(d)) => (a, s, d),
            (a, s, d) => {
                let missing: Vec<&str> = [("API_KEY", a), ("SECRET_KEY", s), ("DOMAIN", d)]
                    .into_iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(k, _)| k)
                    .collect();
                return Err(Error::config(format!(
                    "API_KEY, SECRET_KEY, and DOMAIN are required (missing: {})",
                    missing.join(", ")
                )));
            }
        };

        let subdomains = match (lookup("SUBDOMAINS"), lookup("SUBDOMAIN")) {
            (Some(list), _) if !list.trim().is_empty() => {
                list.split(',').map(|s| s.trim().to_string()).collect()
            }
            (_, Some(single)) => vec![single.trim().to_string()],
            _ => default_subdomains(),
        };

        let ttl = match non_empty("TTL") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                Error::config(format!("TTL must be a positive integer. Got: {}", raw))
            })?,
            None => DEFAULT_TTL,
        };

        let mode = match lookup("DDNS_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "dry-run" => RunMode::DryRun,
            _ => RunMode::Live,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            secret_key: secret_key.trim().to_string(),
            domain: domain.trim().to_lowercase(),
            subdomains,
            ttl,
            api_base: non_empty("PORKBUN_API_BASE").unwrap_or_else(default_api_base),
            mode,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(default_log_level),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || self.secret_key.is_empty() {
            return Err(Error::config("API_KEY and SECRET_KEY cannot be empty"));
        }

        validate_domain_name(&self.domain)?;

        if self.subdomains.is_empty() {
            return Err(Error::config("At least one subdomain entry is required"));
        }

        for subdomain in self.subdomains.iter().filter(|s| !s.is_empty()) {
            validate_subdomain(subdomain)?;
        }

        if self.ttl == 0 {
            return Err(Error::config("TTL must be greater than 0"));
        }

        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(Error::config(format!(
                "PORKBUN_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::config(format!(
                    "LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        Ok(())
    }

    /// The credential pair
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.secret_key.clone())
    }

    /// One target per configured subdomain, in configuration order
    pub fn targets(&self) -> Vec<Target> {
        self.subdomains
            .iter()
            .map(|sub| {
                Target::new(self.domain.clone())
                    .with_subdomain(sub.clone())
                    .with_ttl(self.ttl)
            })
            .collect()
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::DryRun
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters, hyphens.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(Error::config(format!(
            "DOMAIN must be a registered domain such as example.com. Got: {}",
            domain
        )));
    }

    for label in domain.split('.') {
        validate_label(domain, label)?;
    }

    Ok(())
}

/// Validate a subdomain. A leading `*` label is allowed for wildcards.
fn validate_subdomain(subdomain: &str) -> Result<()> {
    for (i, label) in subdomain.split('.').enumerate() {
        if i == 0 && label == "*" {
            continue;
        }
        validate_label(subdomain, label)?;
    }
    Ok(())
}

fn validate_label(name: &str, label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::config(format!("Domain name has empty label: '{}'", name)));
    }

    if label.len() > 63 {
        return Err(Error::config(format!(
            "Domain label too long: {} chars (max 63). Label: '{}'",
            label.len(),
            label
        )));
    }

    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::config(format!(
            "Domain label contains invalid characters. Label: '{}'. \
            Valid: alphanumeric, hyphen and underscore only.",
            label
        )));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(Error::config(format!(
            "Domain label cannot start or end with hyphen. Label: '{}'",
            label
        )));
    }

    Ok(())
}

fn default_subdomains() -> Vec<String> {
    vec![String::new()]
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
