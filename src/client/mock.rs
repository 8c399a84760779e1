//! Mock HamnetDB accessor for testing
//!
//! Provides a fixture-backed implementation of [`HamnetDbApi`] for unit
//! testing the cache layer without network access.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::HamnetDbApi;
use super::models::{Host, Site, Subnet, SubnetAssociations};
use crate::error::UpstreamError;

/// Mock accessor.
///
/// Configure fixtures via builder methods, drive the cache against it,
/// then assert on [`CallCounts`].
///
/// # Example
/// ```ignore
/// let mock = MockHamnetDbClient::new()
///     .with_monitored_hosts(vec![Host::new("44.148.0.1".parse()?, "router")])
///     .await;
///
/// let hosts = mock.fetch_monitored_hosts().await?;
/// assert_eq!(hosts.len(), 1);
/// ```
pub struct MockHamnetDbClient {
    /// Hosts to return from fetch_routing_hosts
    routing_hosts: Arc<Mutex<Vec<Host>>>,
    /// Hosts to return from fetch_monitored_hosts
    monitored_hosts: Arc<Mutex<Vec<Host>>>,
    /// Subnets to return from fetch_subnets
    subnets: Arc<Mutex<Vec<Subnet>>>,
    /// Sites to return from fetch_sites
    sites: Arc<Mutex<Vec<Site>>>,
    /// When set, the direct by-subnet pair fast path is supported
    direct_pairs: Arc<Mutex<Option<SubnetAssociations>>>,
    /// When set, the direct global pair fast path is supported
    direct_pairs_global: Arc<Mutex<Option<SubnetAssociations>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<UpstreamError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
}

impl Default for MockHamnetDbClient {
    fn default() -> Self {
        Self {
            routing_hosts: Arc::new(Mutex::new(Vec::new())),
            monitored_hosts: Arc::new(Mutex::new(Vec::new())),
            subnets: Arc::new(Mutex::new(Vec::new())),
            sites: Arc::new(Mutex::new(Vec::new())),
            direct_pairs: Arc::new(Mutex::new(None)),
            direct_pairs_global: Arc::new(Mutex::new(None)),
            error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
        }
    }
}

/// Tracks accessor call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub routing_hosts: usize,
    pub monitored_hosts: usize,
    pub subnets: usize,
    pub sites: usize,
    pub pairs: usize,
    pub pairs_global: usize,
}

impl CallCounts {
    /// Total number of upstream calls made.
    pub fn total(&self) -> usize {
        self.routing_hosts
            + self.monitored_hosts
            + self.subnets
            + self.sites
            + self.pairs
            + self.pairs_global
    }
}

impl MockHamnetDbClient {
    /// Create a new mock with empty fixtures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure hosts to return from fetch_routing_hosts.
    pub async fn with_routing_hosts(self, hosts: Vec<Host>) -> Self {
        *self.routing_hosts.lock().await = hosts;
        self
    }

    /// Configure hosts to return from fetch_monitored_hosts.
    pub async fn with_monitored_hosts(self, hosts: Vec<Host>) -> Self {
        *self.monitored_hosts.lock().await = hosts;
        self
    }

    /// Configure subnets to return from fetch_subnets.
    pub async fn with_subnets(self, subnets: Vec<Subnet>) -> Self {
        *self.subnets.lock().await = subnets;
        self
    }

    /// Configure sites to return from fetch_sites.
    #[allow(dead_code)]
    pub async fn with_sites(self, sites: Vec<Site>) -> Self {
        *self.sites.lock().await = sites;
        self
    }

    /// Enable the direct by-subnet pair fast path with a fixed result.
    pub async fn with_direct_pairs(self, pairs: SubnetAssociations) -> Self {
        *self.direct_pairs.lock().await = Some(pairs);
        self
    }

    /// Enable the direct global pair fast path with a fixed result.
    pub async fn with_direct_pairs_global(self, pairs: SubnetAssociations) -> Self {
        *self.direct_pairs_global.lock().await = Some(pairs);
        self
    }

    /// Configure an error to return on the next fetch.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: UpstreamError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Inject an error after construction. Consumed on the next fetch.
    pub async fn inject_error(&self, error: UpstreamError) {
        *self.error.lock().await = Some(error);
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<(), UpstreamError> {
        let mut error = self.error.lock().await;
        match error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HamnetDbApi for MockHamnetDbClient {
    async fn fetch_routing_hosts(&self) -> Result<Vec<Host>, UpstreamError> {
        self.call_count.lock().await.routing_hosts += 1;
        self.check_error().await?;
        Ok(self.routing_hosts.lock().await.clone())
    }

    async fn fetch_monitored_hosts(&self) -> Result<Vec<Host>, UpstreamError> {
        self.call_count.lock().await.monitored_hosts += 1;
        self.check_error().await?;
        Ok(self.monitored_hosts.lock().await.clone())
    }

    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, UpstreamError> {
        self.call_count.lock().await.subnets += 1;
        self.check_error().await?;
        Ok(self.subnets.lock().await.clone())
    }

    async fn fetch_sites(&self) -> Result<Vec<Site>, UpstreamError> {
        self.call_count.lock().await.sites += 1;
        self.check_error().await?;
        Ok(self.sites.lock().await.clone())
    }

    async fn fetch_unique_monitored_host_pairs(
        &self,
    ) -> Option<Result<SubnetAssociations, UpstreamError>> {
        let pairs = self.direct_pairs.lock().await.clone()?;
        self.call_count.lock().await.pairs += 1;
        match self.check_error().await {
            Ok(()) => Some(Ok(pairs)),
            Err(e) => Some(Err(e)),
        }
    }

    async fn fetch_unique_monitored_host_pairs_global(
        &self,
    ) -> Option<Result<SubnetAssociations, UpstreamError>> {
        let pairs = self.direct_pairs_global.lock().await.clone()?;
        self.call_count.lock().await.pairs_global += 1;
        match self.check_error().await {
            Ok(()) => Some(Ok(pairs)),
            Err(e) => Some(Err(e)),
        }
    }
}
