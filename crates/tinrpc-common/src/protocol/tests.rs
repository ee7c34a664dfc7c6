//! Tests for the protocol module
//!
//! These tests verify envelope construction and serialization, request-id
//! monotonicity, and response unwrapping.

use super::*;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_request_creation() {
    let req = JsonRpcRequest::new("Admin.getUsers", vec![json!("f"), json!(10)]);
    assert_eq!(req.jsonrpc, "2.0");
    assert_eq!(req.method, "Admin.getUsers");
    assert_eq!(req.params, vec![json!("f"), json!(10)]);
    assert!(req.id > 0);
}

#[test]
fn test_request_ids_strictly_increase() {
    let mut prev = JsonRpcRequest::new("test", vec![]).id;
    for _ in 0..1000 {
        let id = JsonRpcRequest::new("test", vec![]).id;
        assert!(id > prev, "id went backward: {} -> {}", prev, id);
        prev = id;
    }
}

#[test]
fn test_request_id_uniqueness_across_threads() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    let ids = Arc::new(Mutex::new(HashSet::new()));
    let mut handles = vec![];

    for _ in 0..8 {
        let ids_clone = Arc::clone(&ids);
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                let id = next_request_id();
                let mut ids = ids_clone.lock().unwrap();
                assert!(!ids.contains(&id), "Duplicate id: {}", id);
                ids.insert(id);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ids.lock().unwrap().len(), 8_000);
}

#[test]
fn test_request_serialization_shape() {
    let req = JsonRpcRequest::new("Foo.bar", vec![json!(1), json!("two")]);
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["jsonrpc"], json!("2.0"));
    assert_eq!(value["method"], json!("Foo.bar"));
    assert_eq!(value["params"], json!([1, "two"]));
    assert_eq!(value["id"], json!(req.id));
}

#[test]
fn test_response_result_unwraps_to_ok() {
    let resp: JsonRpcResponse =
        serde_json::from_value(json!({"result": {"ok": true}, "id": 7})).unwrap();
    assert_eq!(resp.into_result().unwrap(), json!({"ok": true}));
}

#[test]
fn test_response_error_unwraps_verbatim() {
    let envelope = json!({"code": -32601, "message": "Method not found"});
    let resp: JsonRpcResponse =
        serde_json::from_value(json!({"error": envelope.clone(), "id": 7})).unwrap();
    match resp.into_result() {
        Err(AdapterError::Rpc(e)) => assert_eq!(e, envelope),
        other => panic!("expected Rpc error, got {:?}", other),
    }
}

#[test]
fn test_response_without_result_is_failure() {
    // Missing `result` is a failure even when no `error` field is present.
    let resp: JsonRpcResponse = serde_json::from_value(json!({"id": 7})).unwrap();
    assert!(matches!(
        resp.into_result(),
        Err(AdapterError::InvalidResponse(_))
    ));
}

#[test]
fn test_response_null_result_is_success() {
    // `"result": null` is a present result, not an absent one.
    let resp: JsonRpcResponse =
        serde_json::from_value(json!({"result": null, "id": 7})).unwrap();
    assert_eq!(resp.into_result().unwrap(), json!(null));
}

#[test]
fn test_rpc_envelope_accessor() {
    let err = AdapterError::Rpc(json!({"code": 1}));
    assert_eq!(err.rpc_envelope(), Some(&json!({"code": 1})));
    assert!(AdapterError::Timeout(8000).rpc_envelope().is_none());
}
