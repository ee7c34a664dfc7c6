//! Transport executor
//!
//! Performs one network exchange per RPC call: resolves the request
//! arguments from the current configuration (fail-fast when no endpoint URL
//! is known), issues the HTTP exchange with a deadline, and unwraps the
//! JSON-RPC envelope into a result or an error.
//!
//! # Deadline semantics
//!
//! The exchange is wrapped in `tokio::time::timeout`. When the deadline
//! elapses the request future is dropped, which tears down the in-flight
//! connection: cancellation propagates to the wire, it does not merely stop
//! waiting. The response-body decode happens after the timer is disarmed,
//! matching the original lifecycle.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use tinrpc_common::protocol::{AdapterError, JsonRpcRequest, JsonRpcResponse, Result};

use crate::config::{RequestConfig, SharedHostRegistry};

/// Header carrying the API key, when one is configured.
pub const API_KEY_HEADER: &str = "x-tine20-jsonkey";

/// Header carrying the per-call transaction id (also sent as a query
/// parameter; some server deployments read one, some the other).
pub const TRANSACTION_ID_HEADER: &str = "x-tine20-transactionid";

/// Query parameter carrying the per-call transaction id.
pub const TRANSACTION_ID_PARAM: &str = "transactionid";

/// Default content type for the JSON-RPC path; caller headers override it.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Fully resolved arguments for one exchange.
///
/// `extra_options` is the merged opaque option map. Keys the HTTP layer has
/// no equivalent for (browser-fetch concepts such as `credentials`) are
/// merged and observable here but not applied to the socket.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestArgs {
    pub url: String,
    pub http_method: String,
    pub headers: HashMap<String, String>,
    pub extra_options: HashMap<String, Value>,
    pub timeout_ms: u64,
    pub transaction_id: String,
}

/// The endpoint URL for one exchange: explicit configuration first, the
/// host-application default second. Fails fast when neither is known.
pub fn resolve_endpoint_url(
    config: &RequestConfig,
    registry: &SharedHostRegistry,
) -> Result<String> {
    config
        .url
        .clone()
        .or_else(|| registry.default_url())
        .ok_or_else(|| AdapterError::Configuration("no endpoint URL configured".to_string()))
}

/// Resolves the wire-level arguments for one call.
///
/// Fails with [`AdapterError::Configuration`] before any I/O when no
/// endpoint URL is configured and the host registry offers no default.
/// Merge order, later wins: content-type default, then caller headers, then
/// the transaction-id and API-key headers; credentials-include default
/// option, then caller extras.
pub fn build_request_args(
    config: &RequestConfig,
    registry: &SharedHostRegistry,
) -> Result<RequestArgs> {
    let url = resolve_endpoint_url(config, registry)?;

    let transaction_id = config.next_transaction_id();

    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), DEFAULT_CONTENT_TYPE.to_string());
    headers.extend(config.headers.clone());
    headers.insert(TRANSACTION_ID_HEADER.to_string(), transaction_id.clone());
    if let Some(api_key) = config.api_key.clone().or_else(|| registry.default_api_key()) {
        headers.insert(API_KEY_HEADER.to_string(), api_key);
    }

    let mut extra_options = HashMap::new();
    extra_options.insert("credentials".to_string(), Value::String("include".to_string()));
    extra_options.extend(config.extra_options.clone());

    let separator = if url.contains('?') { '&' } else { '?' };
    let url = format!("{}{}{}={}", url, separator, TRANSACTION_ID_PARAM, transaction_id);

    Ok(RequestArgs {
        url,
        http_method: config.http_method.clone(),
        headers,
        extra_options,
        timeout_ms: config.timeout_ms,
        transaction_id,
    })
}

/// Issues one JSON-RPC exchange and unwraps the envelope.
pub async fn execute_call(
    http: &reqwest::Client,
    args: RequestArgs,
    body: &JsonRpcRequest,
) -> Result<Value> {
    let method = reqwest::Method::from_bytes(args.http_method.as_bytes()).map_err(|_| {
        AdapterError::Configuration(format!("invalid HTTP method: {}", args.http_method))
    })?;

    let payload = serde_json::to_string(body)?;

    let mut request = http.request(method, &args.url).body(payload);
    for (name, value) in &args.headers {
        request = request.header(name, value);
    }

    tracing::debug!(
        method = %body.method,
        id = body.id,
        transaction_id = %args.transaction_id,
        "issuing JSON-RPC request"
    );

    let response = match tokio::time::timeout(
        Duration::from_millis(args.timeout_ms),
        request.send(),
    )
    .await
    {
        Err(_elapsed) => {
            tracing::error!(
                method = %body.method,
                id = body.id,
                timeout_ms = args.timeout_ms,
                "request deadline elapsed, exchange aborted"
            );
            return Err(AdapterError::Timeout(args.timeout_ms));
        }
        Ok(Err(err)) => {
            tracing::error!(method = %body.method, id = body.id, error = %err, "transport failure");
            return Err(err.into());
        }
        Ok(Ok(response)) => response,
    };

    // Deadline disarmed; body decode is not subject to it.
    let bytes = response.bytes().await?;
    let envelope: JsonRpcResponse = serde_json::from_slice(&bytes)
        .map_err(|err| AdapterError::InvalidResponse(format!("malformed JSON body: {}", err)))?;

    envelope.into_result()
}
