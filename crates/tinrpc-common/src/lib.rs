//! tinrpc Common Types
//!
//! This crate provides the protocol layer shared by the tinrpc client
//! adapter: JSON-RPC 2.0 envelope types, the process-wide request-id
//! counter, the error taxonomy, and transaction-id generation.
//!
//! # Overview
//!
//! tinrpc is a JSON-RPC 2.0 client adapter for groupware-style endpoints
//! that expose their whole API behind a single URL. The wire protocol is:
//!
//! - **Request**: `POST <url>?transactionid=<uid>` with body
//!   `{"jsonrpc":"2.0","method":"Namespace.method","params":[...],"id":n}`
//! - **Response**: JSON body with a top-level `result` (success) or
//!   `error` (failure) field
//!
//! # Components
//!
//! - [`protocol`] - Envelope types, request-id counter, error taxonomy
//! - [`uid`] - Random hex transaction-id generation
//!
//! # Example
//!
//! ```
//! use tinrpc_common::{JsonRpcRequest, JsonRpcResponse};
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::new("Calendar.searchEvents", vec![json!({})]);
//!
//! let response: JsonRpcResponse =
//!     serde_json::from_str(r#"{"result": {"totalcount": 0}, "id": 1}"#).unwrap();
//! assert_eq!(response.into_result().unwrap(), json!({"totalcount": 0}));
//! ```

pub mod protocol;
pub mod uid;

pub use protocol::*;
pub use uid::{default_uid_generator, generate_uid, UidGenerator, DEFAULT_UID_LENGTH};
