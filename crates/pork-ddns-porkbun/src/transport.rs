//! HTTP transport for the Porkbun JSON API v3
//!
//! Every endpoint is a POST whose JSON body carries the credential pair
//! next to the endpoint's own fields. There is no header-based auth.

use pork_ddns_core::{Credentials, Error, Result};
use serde::Serialize;
use serde::ser::Error as _;
use serde_json::{Map, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Local address every request is sent from
///
/// Binding the IPv4 wildcard keeps requests on IPv4 on dual-stack hosts,
/// so `ping` reports the address an `A` record should hold.
pub const IPV4_ANY: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body parsed as JSON
    Json(Value),
    /// Body that is not JSON, kept verbatim
    Text(String),
}

/// Status code and body of a provider response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed body
    pub body: ResponseBody,
    /// Raw body text, for diagnostics
    raw: String,
}

impl ApiResponse {
    /// Build a response from a status code and raw body text
    pub fn new(status: u16, raw: String) -> Self {
        let body = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw.clone()),
        };
        Self { status, body, raw }
    }

    /// Raw body text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The JSON body, if the body was JSON
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// A top-level string field of the JSON body
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.json().and_then(|v| v[key].as_str())
    }

    /// HTTP 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// HTTP 200 and `"status": "SUCCESS"`
    pub fn is_success(&self) -> bool {
        self.is_ok() && self.str_field("status") == Some("SUCCESS")
    }
}

/// Merge caller fields with the credential pair
///
/// Caller fields go in first; `apikey` and `secretapikey` are inserted
/// last, so credentials always win over a caller field of the same name.
pub fn assemble_payload(credentials: &Credentials, body: Map<String, Value>) -> Map<String, Value> {
    let mut payload = body;
    payload.insert(
        "apikey".to_string(),
        Value::String(credentials.api_key().to_string()),
    );
    payload.insert(
        "secretapikey".to_string(),
        Value::String(credentials.secret_key().to_string()),
    );
    payload
}

/// Serialize a typed request body into the map form `post` expects
pub fn to_body<T: Serialize>(fields: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(fields)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Json(serde_json::Error::custom(format!(
            "Request body must be a JSON object, got: {}",
            other
        )))),
    }
}

/// POST transport bound to one API base URL
#[derive(Debug, Clone)]
pub struct Transport {
    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL, always ending in `/`
    base_url: String,

    /// Local address the client binds to
    local_address: IpAddr,
}

impl Transport {
    /// Create a transport for the given API base URL
    ///
    /// Requests leave from [`IPV4_ANY`]. No timeout override: the client
    /// keeps the `reqwest` defaults.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("pork-ddns/", env!("CARGO_PKG_VERSION")))
            .local_address(IPV4_ANY)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            local_address: IPV4_ANY,
        })
    }

    /// Local address requests are sent from
    pub fn local_address(&self) -> IpAddr {
        self.local_address
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST `body` plus credentials to `path`
    ///
    /// Any HTTP status is returned to the caller; only transport failures
    /// are errors here.
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/json/v3/<path>
    /// Content-Type: application/json
    ///
    /// { ...body, "apikey": "...", "secretapikey": "..." }
    /// ```
    pub async fn post(
        &self,
        path: &str,
        credentials: &Credentials,
        body: Map<String, Value>,
    ) -> Result<ApiResponse> {
        let payload = assemble_payload(credentials, body);

        tracing::debug!("POST {}", path);

        let response = self
            .client
            .post(self.url(path))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        tracing::debug!("POST {} -> {}", path, status);
        Ok(ApiResponse::new(status, raw))
    }
}
