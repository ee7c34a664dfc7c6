//! tinrpc Client Adapter
//!
//! A configurable JSON-RPC 2.0 client for groupware-style endpoints that
//! expose their whole API behind a single URL: any `Namespace.method`
//! invocation becomes one `POST` exchange carrying a JSON-RPC envelope,
//! with per-call deadline cancellation and response unwrapping.
//!
//! # Architecture
//!
//! - [`adapter`] - The [`RpcAdapter`]: request configuration (fluent
//!   builder), the process-wide default-instance slot, and the core
//!   `call(namespace, method, params)` entry point
//! - [`dispatch`] - The read-only two-level dispatch surface; proxies that
//!   capture names and forward to the core call
//! - [`transport`] - One network exchange per call: argument resolution,
//!   deadline-bounded HTTP, envelope unwrap
//! - [`service_map`] - Fetches the server-advertised method catalogue and
//!   synthesizes a statically named method tree, bridging the legacy
//!   trailing-callback convention
//! - [`config`] - Per-instance configuration state and its normalization
//!   helpers
//!
//! # Example
//!
//! ```no_run
//! use tinrpc_client::{AdapterOptions, RpcAdapter};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> tinrpc_common::Result<()> {
//!     let adapter = RpcAdapter::create_new_instance(
//!         "https://groupware.example.test/index.php",
//!         "s3cret",
//!         AdapterOptions::default(),
//!     )?;
//!
//!     // Explicit core call...
//!     let state = adapter.call("Tinebase", "getState", vec![]).await?;
//!
//!     // ...or the ergonomic dispatch surface.
//!     let events = adapter
//!         .rpc()
//!         .service("Calendar")
//!         .method("searchEvents")
//!         .call(vec![json!({"period": "week"})])
//!         .await?;
//!
//!     println!("{state} {events}");
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod dispatch;
pub mod service_map;
pub mod transport;

pub use adapter::RpcAdapter;
pub use config::{
    normalize_headers, sanitize_extra_options, AdapterOptions, HostRegistry, NoHostRegistry,
    RequestConfig, SharedHostRegistry, DEFAULT_HTTP_METHOD, DEFAULT_TIMEOUT_MS,
};
pub use dispatch::{BuilderOp, MethodProxy, Resolved, RpcSurface, ServiceProxy};
pub use service_map::{
    fetch_service_map, initialize_methods, split_legacy_callback, BoundMethod, CallArg,
    LegacyCallback, MethodTree, ServiceMapDocument, SERVICE_MAP_METHOD,
};
pub use transport::{RequestArgs, API_KEY_HEADER, TRANSACTION_ID_HEADER, TRANSACTION_ID_PARAM};

pub use tinrpc_common::protocol::{AdapterError, JsonRpcRequest, JsonRpcResponse, Result};
