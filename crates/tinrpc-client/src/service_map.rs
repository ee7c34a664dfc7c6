//! Service-map method synthesis
//!
//! A one-time setup pass: fetch the server-advertised catalogue of
//! `Namespace.method` names and install one [`BoundMethod`] per entry into a
//! caller-supplied [`MethodTree`]. Each bound method re-enters the core
//! dispatch path and additionally bridges the legacy trailing-callback
//! calling convention onto it.
//!
//! # Legacy callback bridging
//!
//! Historically callers passed a continuation as the final argument instead
//! of consuming the returned future. [`split_legacy_callback`] detects that
//! convention by positional type-sniffing: the second-to-last argument is
//! checked before the last, and the first callback found is stripped from
//! the wire parameters. The callback only ever observes a success value;
//! failures are not forwarded to it (historical behavior, kept as-is).

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tinrpc_common::protocol::{AdapterError, Result};

use crate::adapter::RpcAdapter;
use crate::transport::resolve_endpoint_url;

/// Well-known method name queried for the service catalogue.
pub const SERVICE_MAP_METHOD: &str = "Tinebase.getServiceMap";

/// The server-advertised service catalogue.
///
/// Keys of `services` are fully qualified `Namespace.method` names; the
/// per-entry descriptors are kept opaque, only the names matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceMapDocument {
    #[serde(default)]
    pub services: BTreeMap<String, Value>,
}

/// A continuation passed in the legacy calling convention.
pub type LegacyCallback = Box<dyn FnOnce(Value) + Send>;

/// One positional argument of a synthesized method call: either a plain
/// JSON value or a legacy continuation.
pub enum CallArg {
    Value(Value),
    Callback(LegacyCallback),
}

impl CallArg {
    pub fn value(value: impl Into<Value>) -> Self {
        CallArg::Value(value.into())
    }

    pub fn callback(callback: impl FnOnce(Value) + Send + 'static) -> Self {
        CallArg::Callback(Box::new(callback))
    }

    fn is_callback(&self) -> bool {
        matches!(self, CallArg::Callback(_))
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

/// Splits a legacy trailing callback off an argument list.
///
/// The second-to-last position is checked before the last; the first match
/// is removed from the wire parameters. Any other callback left in the list
/// serializes as JSON `null`, which is what the original wire format did to
/// functions inside a params array.
pub fn split_legacy_callback(args: Vec<CallArg>) -> (Vec<Value>, Option<LegacyCallback>) {
    let len = args.len();
    let callback_index = if len >= 2 && args[len - 2].is_callback() {
        Some(len - 2)
    } else if len >= 1 && args[len - 1].is_callback() {
        Some(len - 1)
    } else {
        None
    };

    let mut callback = None;
    let mut params = Vec::with_capacity(len);
    for (index, arg) in args.into_iter().enumerate() {
        match arg {
            CallArg::Value(value) => params.push(value),
            CallArg::Callback(cb) if Some(index) == callback_index => callback = Some(cb),
            CallArg::Callback(_) => params.push(Value::Null),
        }
    }

    (params, callback)
}

/// A synthesized wrapper for one advertised `Namespace.method` name.
pub struct BoundMethod {
    adapter: Arc<RpcAdapter>,
    namespace: String,
    method: String,
}

impl BoundMethod {
    pub fn new(
        adapter: Arc<RpcAdapter>,
        namespace: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        BoundMethod {
            adapter,
            namespace: namespace.into(),
            method: method.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.method)
    }

    /// Invokes the method, bridging a legacy trailing callback if present.
    ///
    /// With a callback the stripped parameter list goes on the wire, the
    /// callback receives the resolved result, and the result is still
    /// returned to the async caller. A failure propagates to the async
    /// caller only; the callback never sees it.
    pub async fn invoke(&self, args: Vec<CallArg>) -> Result<Value> {
        let (params, callback) = split_legacy_callback(args);
        match callback {
            Some(callback) => {
                tracing::warn!(
                    method = %self.qualified_name(),
                    "trailing-callback invocation is deprecated, consume the returned future instead"
                );
                let result = self.adapter.call(&self.namespace, &self.method, params).await?;
                callback(result.clone());
                Ok(result)
            }
            None => self.adapter.call(&self.namespace, &self.method, params).await,
        }
    }
}

/// The caller-supplied target object: a statically named method tree
/// mirroring the server's advertised API.
#[derive(Default)]
pub struct MethodTree {
    services: BTreeMap<String, BTreeMap<String, BoundMethod>>,
}

impl MethodTree {
    pub fn new() -> Self {
        MethodTree::default()
    }

    pub fn insert(&mut self, method: BoundMethod) {
        self.services
            .entry(method.namespace.clone())
            .or_default()
            .insert(method.method.clone(), method);
    }

    pub fn method(&self, namespace: &str, method: &str) -> Option<&BoundMethod> {
        self.services.get(namespace)?.get(method)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn method_names<'a>(&'a self, namespace: &str) -> impl Iterator<Item = &'a str> {
        self.services
            .get(namespace)
            .into_iter()
            .flat_map(|methods| methods.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.services.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Fetches the service catalogue from the configured endpoint.
///
/// This is a plain GET against `<url>?method=Tinebase.getServiceMap`,
/// distinct from the JSON-RPC POST path, under the same deadline as
/// configured for calls.
pub async fn fetch_service_map(adapter: &Arc<RpcAdapter>) -> Result<ServiceMapDocument> {
    let config = adapter.config_snapshot();
    let base_url = resolve_endpoint_url(&config, adapter.host_registry())?;
    let separator = if base_url.contains('?') { '&' } else { '?' };
    let url = format!("{}{}method={}", base_url, separator, SERVICE_MAP_METHOD);

    let response = tokio::time::timeout(
        Duration::from_millis(config.timeout_ms),
        adapter.http_client().get(&url).send(),
    )
    .await
    .map_err(|_| AdapterError::Timeout(config.timeout_ms))??;

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|err| AdapterError::InvalidResponse(format!("malformed service map: {}", err)))
}

/// Populates `target` with one wrapper per advertised `Namespace.method`.
///
/// Entries without a dot in the name cannot be placed in a two-level tree
/// and are skipped with a warning.
pub async fn initialize_methods(adapter: &Arc<RpcAdapter>, target: &mut MethodTree) -> Result<()> {
    let document = fetch_service_map(adapter).await?;
    for name in document.services.keys() {
        match name.split_once('.') {
            Some((namespace, method)) => {
                target.insert(BoundMethod::new(Arc::clone(adapter), namespace, method));
            }
            None => {
                tracing::warn!(service = %name, "service-map entry is not Namespace.method, skipped");
            }
        }
    }
    tracing::info!(methods = target.len(), "service map initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;

    fn value_args(values: &[Value]) -> Vec<CallArg> {
        values.iter().cloned().map(CallArg::from).collect()
    }

    #[test]
    fn test_split_without_callback_keeps_all_params() {
        let (params, callback) = split_legacy_callback(value_args(&[json!(1), json!("two")]));
        assert_eq!(params, vec![json!(1), json!("two")]);
        assert!(callback.is_none());
    }

    #[test]
    fn test_split_strips_trailing_callback() {
        let (tx, rx) = mpsc::channel();
        let args = vec![
            CallArg::value(1),
            CallArg::callback(move |v| tx.send(v).unwrap()),
        ];
        let (params, callback) = split_legacy_callback(args);
        assert_eq!(params, vec![json!(1)]);

        callback.unwrap()(json!("done"));
        assert_eq!(rx.recv().unwrap(), json!("done"));
    }

    #[test]
    fn test_split_detects_second_to_last_callback() {
        let (tx, rx) = mpsc::channel();
        let args = vec![
            CallArg::value(1),
            CallArg::callback(move |v| tx.send(v).unwrap()),
            CallArg::value("tail"),
        ];
        let (params, callback) = split_legacy_callback(args);
        assert_eq!(params, vec![json!(1), json!("tail")]);

        callback.unwrap()(json!(2));
        assert_eq!(rx.recv().unwrap(), json!(2));
    }

    #[test]
    fn test_second_to_last_wins_over_last() {
        // Both of the trailing two are callbacks: the second-to-last wins
        // and the loser serializes as null, like a function in a JSON array.
        let (tx, rx) = mpsc::channel();
        let args = vec![
            CallArg::value(1),
            CallArg::callback(move |v| tx.send(v).unwrap()),
            CallArg::callback(|_| panic!("last callback must not be selected")),
        ];
        let (params, callback) = split_legacy_callback(args);
        assert_eq!(params, vec![json!(1), Value::Null]);

        callback.unwrap()(json!("winner"));
        assert_eq!(rx.recv().unwrap(), json!("winner"));
    }

    #[test]
    fn test_single_callback_argument_is_stripped() {
        let (tx, rx) = mpsc::channel();
        let args = vec![CallArg::callback(move |v| tx.send(v).unwrap())];
        let (params, callback) = split_legacy_callback(args);
        assert!(params.is_empty());

        callback.unwrap()(json!(null));
        assert_eq!(rx.recv().unwrap(), json!(null));
    }

    #[test]
    fn test_service_map_document_parses() {
        let document: ServiceMapDocument = serde_json::from_value(json!({
            "services": {
                "Admin.getUsers": {"parameters": []},
                "Calendar.searchEvents": {}
            },
            "version": "irrelevant"
        }))
        .unwrap();
        assert_eq!(document.services.len(), 2);
        assert!(document.services.contains_key("Admin.getUsers"));
    }

    #[test]
    fn test_method_tree_lookup() {
        use crate::config::AdapterOptions;

        let adapter =
            RpcAdapter::create_new_instance("http://example.test", "key", AdapterOptions::default())
                .unwrap();
        let mut tree = MethodTree::new();
        tree.insert(BoundMethod::new(Arc::clone(&adapter), "Foo", "bar"));
        tree.insert(BoundMethod::new(Arc::clone(&adapter), "Foo", "baz"));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.method("Foo", "bar").unwrap().qualified_name(), "Foo.bar");
        assert!(tree.method("Foo", "missing").is_none());
        assert_eq!(tree.method_names("Foo").collect::<Vec<_>>(), vec!["bar", "baz"]);
    }
}
