//! Request configuration
//!
//! Per-adapter mutable state: endpoint URL, API key, HTTP method, headers,
//! timeout, and extra transport options. Header keys are case-normalized to
//! lowercase, and the extra-option map never carries the `headers`, `method`
//! or `body` keys, which are owned by the transport executor.
//!
//! Setter-level validation lives on [`crate::adapter::RpcAdapter`]; the pure
//! normalization helpers here are independently testable.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use tinrpc_common::protocol::{AdapterError, Result};
use tinrpc_common::uid::{default_uid_generator, UidGenerator, DEFAULT_UID_LENGTH};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

/// Default HTTP method for the JSON-RPC path.
pub const DEFAULT_HTTP_METHOD: &str = "POST";

/// Keys of `extra_options` owned by the transport executor, stripped on set.
const RESERVED_OPTION_KEYS: &[&str] = &["headers", "method", "body"];

/// Lowercases every header key. The value map is replaced wholesale by the
/// setter, so no merging with prior headers happens here or anywhere else.
pub fn normalize_headers(headers: HashMap<String, String>) -> HashMap<String, String> {
    headers
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

/// Strips the transport-owned keys from an extra-option map.
pub fn sanitize_extra_options(mut options: HashMap<String, Value>) -> HashMap<String, Value> {
    for key in RESERVED_OPTION_KEYS {
        options.remove(*key);
    }
    options
}

/// Named construction options for an adapter instance.
///
/// Mirrors the construction surface `new Adapter(url, apiKey, {timeout,
/// method, uidGenerator, headers, otherOptions})`: everything optional,
/// defaults applied in [`RequestConfig::new`].
#[derive(Default)]
pub struct AdapterOptions {
    pub timeout_ms: Option<u64>,
    pub http_method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub extra_options: Option<HashMap<String, Value>>,
    pub uid_generator: Option<UidGenerator>,
    /// Host-application registry consulted for defaults never explicitly
    /// configured (endpoint URL, API key).
    pub host_registry: Option<SharedHostRegistry>,
}

/// One adapter instance's request configuration.
///
/// Mutated only through the adapter's fluent setters. `Clone` deep-copies
/// the mapping fields and shares the generator `Arc`, so a cloned
/// configuration is fully independent of the original.
#[derive(Clone)]
pub struct RequestConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub http_method: String,
    pub headers: HashMap<String, String>,
    pub timeout_ms: u64,
    pub extra_options: HashMap<String, Value>,
    pub uid_generator: UidGenerator,
}

impl RequestConfig {
    pub fn new(url: Option<String>, api_key: Option<String>, options: AdapterOptions) -> Self {
        RequestConfig {
            url: url.filter(|u| !u.is_empty()),
            api_key,
            http_method: options
                .http_method
                .unwrap_or_else(|| DEFAULT_HTTP_METHOD.to_string()),
            headers: normalize_headers(options.headers.unwrap_or_default()),
            timeout_ms: options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            extra_options: sanitize_extra_options(options.extra_options.unwrap_or_default()),
            uid_generator: options.uid_generator.unwrap_or_else(default_uid_generator),
        }
    }

    /// Draws a fresh transaction id from the configured generator.
    pub fn next_transaction_id(&self) -> String {
        (self.uid_generator)(DEFAULT_UID_LENGTH)
    }

    /// Validates a loosely typed timeout value (configuration often arrives
    /// as raw JSON). Accepts positive integers only.
    pub fn parse_timeout(value: &Value) -> Result<u64> {
        match value.as_u64() {
            Some(ms) if ms > 0 => Ok(ms),
            _ => Err(AdapterError::InvalidArgument(format!(
                "timeout must be a positive number of milliseconds, got {}",
                value
            ))),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        RequestConfig::new(None, None, AdapterOptions::default())
    }
}

impl std::fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("http_method", &self.http_method)
            .field("headers", &self.headers)
            .field("timeout_ms", &self.timeout_ms)
            .field("extra_options", &self.extra_options)
            .finish()
    }
}

/// Host-application registry consulted only for values that were never
/// explicitly configured: a default endpoint URL and a default API key.
pub trait HostRegistry: Send + Sync {
    fn default_url(&self) -> Option<String> {
        None
    }

    fn default_api_key(&self) -> Option<String> {
        None
    }
}

/// Registry used when the host application supplies none: no fallbacks.
pub struct NoHostRegistry;

impl HostRegistry for NoHostRegistry {}

pub type SharedHostRegistry = Arc<dyn HostRegistry>;
