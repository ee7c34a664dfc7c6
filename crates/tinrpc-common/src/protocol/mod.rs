//! Core protocol types for the tinrpc client adapter.
//!
//! - [`jsonrpc`] - JSON-RPC 2.0 request/response envelopes and the
//!   process-wide request-id counter
//! - [`error`] - Error taxonomy and `Result` alias

pub mod error;
pub mod jsonrpc;

#[cfg(test)]
mod tests;

pub use error::{AdapterError, Result};
pub use jsonrpc::{next_request_id, JsonRpcRequest, JsonRpcResponse, RequestId, JSONRPC_VERSION};
