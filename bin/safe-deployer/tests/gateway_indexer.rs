//! Tests for the client-gateway indexer against a mocked gateway.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{address, Address};
use safe_deployer::common::GatewayIndexer;
use safe_proxy::{
    test_utils::MockTransport, ContractAddress, Indexer, IndexerError, InstanceCache,
    MasterCopyResolver, NetworkId, RegistryTable, ResolutionSource, ResolutionStatus,
};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const PROXY: Address = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
const MASTER_COPY: Address = address!("0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552");

fn safe_info_path() -> String {
    format!("/v1/chains/250/safes/{}/", ContractAddress::new(PROXY).to_checksum())
}

fn indexer(server: &MockServer, timeout: Duration) -> GatewayIndexer {
    let base = format!("{}/v1", server.uri()).parse().unwrap();
    GatewayIndexer::new(base, timeout).unwrap()
}

#[tokio::test]
async fn test_known_proxy_reports_implementation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(safe_info_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "value": ContractAddress::new(PROXY).to_checksum() },
            "nonce": 3,
            "threshold": 2,
            "implementation": { "value": "0xd9db270c1b5e3bd161e8c8503c55ceabee709552", "name": "Safe 1.3.0" },
            "version": "1.3.0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = indexer(&server, Duration::from_secs(5))
        .implementation_address(NetworkId::Fantom, ContractAddress::new(PROXY))
        .await
        .unwrap();
    assert_eq!(found, Some(ContractAddress::new(MASTER_COPY)));
}

#[tokio::test]
async fn test_unknown_proxy_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(safe_info_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let found = indexer(&server, Duration::from_secs(5))
        .implementation_address(NetworkId::Fantom, ContractAddress::new(PROXY))
        .await
        .unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(502)).mount(&server).await;

    let err = indexer(&server, Duration::from_secs(5))
        .implementation_address(NetworkId::Fantom, ContractAddress::new(PROXY))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::Transient(_)), "{err}");
}

#[tokio::test]
async fn test_unexpected_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "implementation": "nope" })))
        .mount(&server)
        .await;

    let err = indexer(&server, Duration::from_secs(5))
        .implementation_address(NetworkId::Fantom, ContractAddress::new(PROXY))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::Malformed(_)), "{err}");
}

#[tokio::test]
async fn test_bad_implementation_address_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "implementation": { "value": "0x1234" } })),
        )
        .mount(&server)
        .await;

    let err = indexer(&server, Duration::from_secs(5))
        .implementation_address(NetworkId::Fantom, ContractAddress::new(PROXY))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::Malformed(_)), "{err}");
}

#[tokio::test]
async fn test_slow_gateway_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = indexer(&server, Duration::from_millis(100))
        .implementation_address(NetworkId::Fantom, ContractAddress::new(PROXY))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::Transient(_)), "{err}");
}

/// The resolver reports a proxy the gateway does not know as not found, and never falls back
/// to reading the chain.
#[tokio::test]
async fn test_resolver_reports_not_found_without_chain_access() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(safe_info_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = Arc::new(MockTransport::new(NetworkId::Fantom));
    let cache = InstanceCache::new(transport.clone(), RegistryTable::canonical(), NetworkId::Fantom);
    let resolver =
        MasterCopyResolver::new(cache, Arc::new(indexer(&server, Duration::from_secs(5))));

    let resolution = resolver.resolve_master_copy(ContractAddress::new(PROXY)).await.unwrap();
    assert_eq!(resolution.status, ResolutionStatus::NotFound);
    assert_eq!(resolution.source, ResolutionSource::Indexer);
    assert_eq!(transport.calls(), 0);
}
