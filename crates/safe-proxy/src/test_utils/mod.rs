//! Scriptable doubles of the network and indexer collaborators.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy_primitives::Bytes;

use crate::{
    ContractAddress, EncodedCall, Indexer, IndexerError, NetworkId, NetworkTransport,
    TransportError,
};

/// In-memory [`NetworkTransport`].
///
/// Unscripted calls answer with empty return data, unscripted estimates with 100 000 gas.
#[derive(Debug)]
pub struct MockTransport {
    network: Mutex<Result<NetworkId, TransportError>>,
    latency: Mutex<Duration>,
    call_responses: Mutex<HashMap<(ContractAddress, [u8; 4]), Result<Bytes, TransportError>>>,
    gas_estimate: Mutex<Result<u64, TransportError>>,
    network_id_calls: AtomicUsize,
    calls: AtomicUsize,
    estimate_calls: AtomicUsize,
}

impl MockTransport {
    /// A transport connected to `network` with no latency.
    pub fn new(network: NetworkId) -> Self {
        Self {
            network: Mutex::new(Ok(network)),
            latency: Mutex::new(Duration::ZERO),
            call_responses: Mutex::new(HashMap::new()),
            gas_estimate: Mutex::new(Ok(100_000)),
            network_id_calls: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
        }
    }

    /// Delays every request by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = latency;
        self
    }

    /// Reconnects the transport to `network`.
    pub fn set_network(&self, network: NetworkId) {
        *self.network.lock().unwrap() = Ok(network);
    }

    /// Makes every network id query fail with `error`.
    pub fn fail_network_id(&self, error: TransportError) {
        *self.network.lock().unwrap() = Err(error);
    }

    /// Scripts the answer to calls against `target` whose payload starts with `selector`.
    pub fn set_call_response(
        &self,
        target: ContractAddress,
        selector: [u8; 4],
        response: Result<Bytes, TransportError>,
    ) {
        self.call_responses.lock().unwrap().insert((target, selector), response);
    }

    /// Scripts the answer to every gas estimate.
    pub fn set_gas_estimate(&self, response: Result<u64, TransportError>) {
        *self.gas_estimate.lock().unwrap() = response;
    }

    /// Number of network id queries served so far.
    pub fn network_id_calls(&self) -> usize {
        self.network_id_calls.load(Ordering::SeqCst)
    }

    /// Number of `call`s served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of gas estimates served so far.
    pub fn estimate_calls(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl NetworkTransport for MockTransport {
    async fn call(
        &self,
        target: ContractAddress,
        data: Bytes,
        _from: Option<ContractAddress>,
    ) -> Result<Bytes, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let Some(selector) = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) else {
            return Ok(Bytes::new());
        };
        self.call_responses
            .lock()
            .unwrap()
            .get(&(target, selector))
            .cloned()
            .unwrap_or_else(|| Ok(Bytes::new()))
    }

    async fn estimate_gas(
        &self,
        _call: &EncodedCall,
        _from: ContractAddress,
    ) -> Result<u64, TransportError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.gas_estimate.lock().unwrap().clone()
    }

    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        self.network_id_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.network.lock().unwrap().clone()
    }
}

/// In-memory [`Indexer`]. Unknown proxies have no record.
#[derive(Debug, Default)]
pub struct MockIndexer {
    records: Mutex<HashMap<ContractAddress, Result<Option<ContractAddress>, IndexerError>>>,
    latency: Mutex<Duration>,
    lookups: AtomicUsize,
}

impl MockIndexer {
    /// An indexer with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every lookup by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = latency;
        self
    }

    /// Records `implementation` as the master copy of `proxy`.
    pub fn insert(&self, proxy: ContractAddress, implementation: ContractAddress) {
        self.records.lock().unwrap().insert(proxy, Ok(Some(implementation)));
    }

    /// Makes lookups of `proxy` fail with `error`.
    pub fn fail(&self, proxy: ContractAddress, error: IndexerError) {
        self.records.lock().unwrap().insert(proxy, Err(error));
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Indexer for MockIndexer {
    async fn implementation_address(
        &self,
        _network: NetworkId,
        proxy: ContractAddress,
    ) -> Result<Option<ContractAddress>, IndexerError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.records.lock().unwrap().get(&proxy).cloned().unwrap_or(Ok(None))
    }
}
