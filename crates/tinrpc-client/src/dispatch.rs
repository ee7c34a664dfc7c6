//! Dynamic dispatch surface
//!
//! A read-only, two-level namespace view over an adapter: the first level
//! names a remote service, the second a method on it, and invoking the
//! resulting handle issues one JSON-RPC exchange. All logic lives in
//! [`RpcAdapter::call`]; the proxies here only capture names.
//!
//! String-keyed lookup goes through [`RpcSurface::resolve`], which keeps the
//! dynamic semantics honest for hosting code that probes the surface by
//! property name:
//!
//! - the reserved builder names (`createRequest`, `createNewInstance`)
//!   resolve to the real builder operations, never to a synthesized call;
//! - a small set of framework-probe names (`then`, `toJSON`, ...) resolve
//!   to an explicit *absent* answer instead of throwing or issuing network
//!   I/O, because hosting frameworks introspect foreign objects for
//!   sentinel members they do not own;
//! - everything else is a service namespace.
//!
//! The surface is read-only by construction: nothing here takes `&mut` and
//! no property can be shadowed by assignment.

use serde_json::Value;
use std::sync::Arc;

use tinrpc_common::protocol::Result;

use crate::adapter::RpcAdapter;

/// Reserved adapter-own operations that must not become RPC calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderOp {
    CreateRequest,
    CreateNewInstance,
}

/// Property names hosting frameworks probe for; answered "absent".
pub const FRAMEWORK_PROBE_PROPS: &[&str] = &[
    "then",
    "catch",
    "finally",
    "toJSON",
    "constructor",
    "prototype",
    "inspect",
];

/// Outcome of a string-keyed first-level lookup.
pub enum Resolved {
    /// A reserved builder operation.
    Builder(BuilderOp),
    /// A framework-probe name; explicitly not present.
    Absent,
    /// A service namespace; any method on it becomes a call.
    Service(ServiceProxy),
}

/// The dispatch-capable view of an adapter.
#[derive(Clone)]
pub struct RpcSurface {
    adapter: Arc<RpcAdapter>,
}

impl RpcSurface {
    pub(crate) fn new(adapter: Arc<RpcAdapter>) -> Self {
        RpcSurface { adapter }
    }

    /// Classifies a first-level property access.
    pub fn resolve(&self, prop: &str) -> Resolved {
        match prop {
            "createRequest" => Resolved::Builder(BuilderOp::CreateRequest),
            "createNewInstance" => Resolved::Builder(BuilderOp::CreateNewInstance),
            _ if FRAMEWORK_PROBE_PROPS.contains(&prop) => Resolved::Absent,
            _ => Resolved::Service(self.service(prop)),
        }
    }

    /// The proxy for one remote service namespace.
    pub fn service(&self, namespace: impl Into<String>) -> ServiceProxy {
        ServiceProxy {
            adapter: Arc::clone(&self.adapter),
            namespace: namespace.into(),
        }
    }

    pub fn adapter(&self) -> &Arc<RpcAdapter> {
        &self.adapter
    }
}

/// First-level handle: a remote service namespace.
#[derive(Clone)]
pub struct ServiceProxy {
    adapter: Arc<RpcAdapter>,
    namespace: String,
}

impl ServiceProxy {
    pub fn name(&self) -> &str {
        &self.namespace
    }

    /// The handle for one method on this service.
    pub fn method(&self, name: impl Into<String>) -> MethodProxy {
        MethodProxy {
            adapter: Arc::clone(&self.adapter),
            namespace: self.namespace.clone(),
            method: name.into(),
        }
    }

    /// Shorthand for `self.method(name).call(params)`.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.adapter.call(&self.namespace, method, params).await
    }
}

/// Second-level handle: one remote operation, invocable any number of
/// times. Each call is an independent exchange with a fresh request id.
#[derive(Clone)]
pub struct MethodProxy {
    adapter: Arc<RpcAdapter>,
    namespace: String,
    method: String,
}

impl MethodProxy {
    /// The fully qualified `namespace.method` wire name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.method)
    }

    pub async fn call(&self, params: Vec<Value>) -> Result<Value> {
        self.adapter
            .call(&self.namespace, &self.method, params)
            .await
    }
}
