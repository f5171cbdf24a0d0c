//! Tests for the JSON-RPC transport against a mocked node.

use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use safe_deployer::common::RpcTransport;
use safe_proxy::{
    CallKind, ContractAddress, EncodedCall, GasEstimator, NetworkId, NetworkTransport, ProxyError,
    TransportError,
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method},
    Mock, MockServer, Request, ResponseTemplate,
};

/// Answers a JSON-RPC request with `body`, echoing the request id.
fn rpc_reply(body: Value) -> impl Fn(&Request) -> ResponseTemplate {
    move |request: &Request| {
        let id = request.body_json::<Value>().map(|req| req["id"].clone()).unwrap_or(json!(0));
        let mut reply = json!({ "jsonrpc": "2.0", "id": id });
        for (key, value) in body.as_object().unwrap() {
            reply[key] = value.clone();
        }
        ResponseTemplate::new(200).set_body_json(reply)
    }
}

fn transport(server: &MockServer, timeout: Duration) -> RpcTransport {
    RpcTransport::new(server.uri().parse().unwrap(), timeout)
}

fn target() -> ContractAddress {
    ContractAddress::new(Address::repeat_byte(0xbb))
}

#[tokio::test]
async fn test_network_id_maps_chain_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_chainId" })))
        .respond_with(rpc_reply(json!({ "result": "0xfa2" })))
        .mount(&server)
        .await;

    let transport = transport(&server, Duration::from_secs(5));
    assert_eq!(transport.network_id().await.unwrap(), NetworkId::FantomTestnet);
}

#[tokio::test]
async fn test_call_returns_raw_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(rpc_reply(json!({ "result": "0xdeadbeef" })))
        .mount(&server)
        .await;

    let transport = transport(&server, Duration::from_secs(5));
    let output = transport.call(target(), Bytes::from_static(&[0xa6, 0x19, 0x48, 0x6e]), None).await;
    assert_eq!(output.unwrap(), Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]));
}

/// A revert during estimation reaches the caller with the node's message intact.
#[tokio::test]
async fn test_estimate_revert_is_estimation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_estimateGas" })))
        .respond_with(rpc_reply(json!({
            "error": { "code": 3, "message": "execution reverted: GS013", "data": "0x" }
        })))
        .mount(&server)
        .await;

    let transport = transport(&server, Duration::from_secs(5));
    let call = EncodedCall::new(CallKind::CreateProxyWithNonce, target(), vec![0x16, 0x88, 0xf0, 0xb9]);

    let raw = transport.estimate_gas(&call, ContractAddress::ZERO).await.unwrap_err();
    assert_eq!(raw, TransportError::Rejected("execution reverted: GS013".into()));

    let err = GasEstimator::new(std::sync::Arc::new(transport))
        .estimate(&call, ContractAddress::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err, ProxyError::EstimationFailed("execution reverted: GS013".into()));
}

#[tokio::test]
async fn test_estimate_is_doubled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_estimateGas" })))
        .respond_with(rpc_reply(json!({ "result": "0x3d090" })))
        .mount(&server)
        .await;

    let transport = transport(&server, Duration::from_secs(5));
    let call = EncodedCall::new(CallKind::MultiSend, target(), vec![0x8d, 0x80, 0xff, 0x0a]);
    let estimate = GasEstimator::new(std::sync::Arc::new(transport))
        .estimate(&call, ContractAddress::ZERO)
        .await
        .unwrap();
    assert_eq!(estimate.estimated, 250_000);
    assert_eq!(estimate.limit, 500_000);
}

#[tokio::test]
async fn test_slow_node_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jsonrpc": "2.0", "id": 0, "result": "0xfa" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let transport = transport(&server, Duration::from_millis(100));
    let err = transport.network_id().await.unwrap_err();
    assert!(matches!(err, TransportError::Unavailable(ref msg) if msg.contains("timed out")), "{err}");
}

#[tokio::test]
async fn test_http_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

    let transport = transport(&server, Duration::from_secs(5));
    let err = transport.network_id().await.unwrap_err();
    assert!(matches!(err, TransportError::Unavailable(_)), "{err}");
}
