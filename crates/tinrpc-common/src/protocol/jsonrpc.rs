//! JSON-RPC 2.0 Protocol Types
//!
//! This module implements the client side of the JSON-RPC 2.0 wire format:
//! - Request format: `{"jsonrpc": "2.0", "method": "...", "params": [...], "id": ...}`
//! - Response format: `{"result": ..., "error": ..., "id": ...}`
//!
//! Request ids are drawn from a process-wide counter shared by every adapter
//! instance, so ids are unique and strictly increasing across the whole
//! process regardless of how many adapters issue calls.
//!
//! # Example
//!
//! ```
//! use tinrpc_common::protocol::JsonRpcRequest;
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::new("Admin.getUsers", vec![json!("filter")]);
//! assert_eq!(request.jsonrpc, "2.0");
//! assert_eq!(request.method, "Admin.getUsers");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::{AdapterError, Result};

/// JSON-RPC version sent on every request.
pub const JSONRPC_VERSION: &str = "2.0";

pub type RequestId = u64;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns the next process-wide request id.
///
/// Strictly increasing, starting at 1. Shared across all adapter instances
/// so no two in-flight calls ever observe the same id.
pub fn next_request_id() -> RequestId {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst) + 1
}

/// A JSON-RPC 2.0 request as sent on the wire.
///
/// `method` is the fully qualified `namespace.method` name and `params` is
/// the ordered sequence of call arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: RequestId,
}

impl JsonRpcRequest {
    /// Builds a request for `method`, drawing the next process-wide id.
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: next_request_id(),
        }
    }
}

/// A JSON-RPC response envelope, parsed leniently.
///
/// Servers are not uniformly spec-compliant: the envelope may lack `error`
/// even on failure, and `id` may be absent or of any JSON type. Absence of
/// `result` is always treated as failure, but a present `"result": null`
/// is a success. The two cases must stay distinguishable, hence the manual
/// `Deserialize` below.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonRpcResponse {
    pub result: Option<Value>,
    pub error: Option<Value>,
    pub id: Option<Value>,
}

impl<'de> Deserialize<'de> for JsonRpcResponse {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let body = Value::deserialize(deserializer)?;
        Ok(JsonRpcResponse {
            result: body.get("result").cloned(),
            error: body.get("error").cloned().filter(|e| !e.is_null()),
            id: body.get("id").cloned(),
        })
    }
}

impl JsonRpcResponse {
    /// Unwraps the envelope into the caller-visible outcome.
    ///
    /// - `result` present: success with that value.
    /// - `error` present: [`AdapterError::Rpc`] carrying the envelope verbatim.
    /// - neither: [`AdapterError::InvalidResponse`].
    pub fn into_result(self) -> Result<Value> {
        match (self.result, self.error) {
            (Some(result), _) => Ok(result),
            (None, Some(error)) => Err(AdapterError::Rpc(error)),
            (None, None) => Err(AdapterError::InvalidResponse(
                "response carries neither result nor error".to_string(),
            )),
        }
    }
}
