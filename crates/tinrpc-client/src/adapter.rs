//! RPC adapter and singleton registry
//!
//! An [`RpcAdapter`] owns one request configuration and talks to exactly one
//! endpoint. The process keeps at most one *default* instance in a
//! mutex-guarded slot:
//!
//! - [`RpcAdapter::initialize`] performs a check-and-set on the slot; a
//!   second initialization logs a warning and hands back the existing
//!   instance unchanged rather than failing the caller.
//! - [`RpcAdapter::default_instance`] lazily initializes the slot with
//!   defaults.
//! - [`RpcAdapter::create_new_instance`] and [`RpcAdapter::clone_instance`]
//!   produce independent instances and never touch the slot.
//!
//! Configuration is mutated only through the fluent setters, which serialize
//! through a mutex so the adapter stays safe on a multi-threaded runtime.
//!
//! # Example
//!
//! ```no_run
//! use tinrpc_client::RpcAdapter;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = RpcAdapter::default_instance();
//!     adapter
//!         .set_url("https://groupware.example.test/index.php")
//!         .set_api_key("s3cret");
//!
//!     let users = adapter
//!         .call("Admin", "getUsers", vec![json!("filter")])
//!         .await
//!         .unwrap();
//!     println!("{users}");
//! }
//! ```

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tinrpc_common::protocol::{AdapterError, JsonRpcRequest, Result};
use tinrpc_common::uid::UidGenerator;

use crate::config::{
    normalize_headers, sanitize_extra_options, AdapterOptions, NoHostRegistry, RequestConfig,
    SharedHostRegistry,
};
use crate::dispatch::RpcSurface;
use crate::transport::{build_request_args, execute_call};

/// Process-wide slot for the default instance.
static DEFAULT_INSTANCE: Mutex<Option<Arc<RpcAdapter>>> = Mutex::new(None);

/// A JSON-RPC client adapter bound to a single endpoint.
pub struct RpcAdapter {
    config: Mutex<RequestConfig>,
    registry: SharedHostRegistry,
    http: reqwest::Client,
}

impl RpcAdapter {
    fn from_config(config: RequestConfig, registry: SharedHostRegistry) -> Arc<Self> {
        Arc::new(RpcAdapter {
            config: Mutex::new(config),
            registry,
            http: reqwest::Client::new(),
        })
    }

    fn build(url: Option<String>, api_key: Option<String>, mut options: AdapterOptions) -> Arc<Self> {
        let registry = options
            .host_registry
            .take()
            .unwrap_or_else(|| Arc::new(NoHostRegistry));
        Self::from_config(RequestConfig::new(url, api_key, options), registry)
    }

    /// Initializes the process-wide default instance.
    ///
    /// If the slot is already occupied the existing instance is returned
    /// unchanged and a warning is logged; the caller never observes an
    /// error for the violation.
    pub fn initialize(
        url: Option<String>,
        api_key: Option<String>,
        options: AdapterOptions,
    ) -> Arc<Self> {
        let mut slot = DEFAULT_INSTANCE.lock().expect("default-instance slot poisoned");
        if let Some(existing) = slot.as_ref() {
            tracing::warn!("default adapter instance already exists, returning it unchanged");
            return Arc::clone(existing);
        }
        let instance = Self::build(url, api_key, options);
        *slot = Some(Arc::clone(&instance));
        instance
    }

    /// Returns the default instance, lazily initializing it with defaults.
    pub fn default_instance() -> Arc<Self> {
        let mut slot = DEFAULT_INSTANCE.lock().expect("default-instance slot poisoned");
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }
        let instance = Self::build(None, None, AdapterOptions::default());
        *slot = Some(Arc::clone(&instance));
        instance
    }

    /// Creates an independently configured instance, bypassing the default
    /// slot entirely. Both the URL and the API key are required here.
    pub fn create_new_instance(
        url: impl Into<String>,
        api_key: impl Into<String>,
        options: AdapterOptions,
    ) -> Result<Arc<Self>> {
        let url = url.into();
        let api_key = api_key.into();
        if url.is_empty() || api_key.is_empty() {
            return Err(AdapterError::Configuration(
                "url and api key are required to initialize a new instance".to_string(),
            ));
        }
        Ok(Self::build(Some(url), Some(api_key), options))
    }

    /// Produces a new, fully independent instance with identical
    /// configuration values. Mapping fields are copied, never shared, so
    /// mutating the clone's headers cannot affect the original. The default
    /// slot is not consulted or modified.
    pub fn clone_instance(&self) -> Arc<Self> {
        Self::from_config(self.config().clone(), Arc::clone(&self.registry))
    }

    fn config(&self) -> MutexGuard<'_, RequestConfig> {
        self.config.lock().expect("adapter config poisoned")
    }

    pub(crate) fn config_snapshot(&self) -> RequestConfig {
        self.config().clone()
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn host_registry(&self) -> &SharedHostRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Fluent setters
    // ------------------------------------------------------------------

    /// Replaces the header map wholesale, lowercasing every key. No merge
    /// with prior headers.
    pub fn set_headers(&self, headers: HashMap<String, String>) -> &Self {
        self.config().headers = normalize_headers(headers);
        self
    }

    /// Replaces the extra transport options wholesale; `headers`, `method`
    /// and `body` are stripped because the transport executor owns them.
    pub fn set_other_options(&self, options: HashMap<String, Value>) -> &Self {
        self.config().extra_options = sanitize_extra_options(options);
        self
    }

    /// Sets the per-call timeout. The value must be a positive number of
    /// milliseconds; on rejection the prior timeout is left untouched.
    pub fn set_timeout(&self, timeout: impl Into<Value>) -> Result<&Self> {
        let ms = RequestConfig::parse_timeout(&timeout.into())?;
        self.config().timeout_ms = ms;
        Ok(self)
    }

    /// Sets the endpoint URL. An empty value is a no-op so an accidental
    /// blank never clears a previously configured endpoint.
    pub fn set_url(&self, url: impl Into<String>) -> &Self {
        let url = url.into();
        if !url.is_empty() {
            self.config().url = Some(url);
        }
        self
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) -> &Self {
        self.config().api_key = Some(api_key.into());
        self
    }

    pub fn set_http_method(&self, method: impl Into<String>) -> &Self {
        self.config().http_method = method.into();
        self
    }

    pub fn set_uid_generator(&self, generator: UidGenerator) -> &Self {
        self.config().uid_generator = generator;
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        self.config().timeout_ms
    }

    pub fn headers(&self) -> HashMap<String, String> {
        self.config().headers.clone()
    }

    pub fn url(&self) -> Option<String> {
        self.config().url.clone()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// The dispatch surface over this adapter (read-only view).
    pub fn rpc(self: &Arc<Self>) -> RpcSurface {
        RpcSurface::new(Arc::clone(self))
    }

    /// Invokes `namespace.method` with the given positional parameters.
    ///
    /// Every invocation is a fresh network exchange; no caching, coalescing
    /// or retry happens here. Configuration errors surface before any I/O.
    pub async fn call(&self, namespace: &str, method: &str, params: Vec<Value>) -> Result<Value> {
        self.call_method(format!("{}.{}", namespace, method), params)
            .await
    }

    /// Invokes an already fully qualified `namespace.method` name.
    pub async fn call_method(
        &self,
        method: impl Into<String>,
        params: Vec<Value>,
    ) -> Result<Value> {
        // Resolve the wire arguments first so configuration errors fail
        // fast without consuming a request id.
        let args = {
            let config = self.config();
            build_request_args(&config, &self.registry)?
        };
        let request = JsonRpcRequest::new(method, params);
        execute_call(&self.http, args, &request).await
    }
}

impl std::fmt::Debug for RpcAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcAdapter").field("config", &*self.config()).finish()
    }
}
