//! Refresh coordination
//!
//! Decides per query whether to serve the store or refresh through the
//! accessor, and keeps refreshes from interleaving. One coarse lock over
//! the store serializes every get-or-refresh, including the upstream
//! await: a background pass never observes a half-updated read, and no
//! two fetches for the same batch run concurrently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::store::{CachedData, DataKind, TypedResultStore};
use crate::assoc;
use crate::client::HamnetDbApi;
use crate::client::models::{Host, Site, Subnet, SubnetAssociations};
use crate::error::UpstreamError;

pub(crate) struct RefreshCoordinator<C> {
    accessor: Arc<C>,
    store: Mutex<TypedResultStore>,
}

impl<C: HamnetDbApi> RefreshCoordinator<C> {
    pub(crate) fn new(accessor: C, ttl: Duration) -> Self {
        Self {
            accessor: Arc::new(accessor),
            store: Mutex::new(TypedResultStore::new(ttl)),
        }
    }

    pub(crate) fn accessor(&self) -> &C {
        &self.accessor
    }

    pub(crate) async fn routing_hosts(
        &self,
        now: Instant,
    ) -> Result<Arc<Vec<Host>>, UpstreamError> {
        let mut store = self.store.lock().await;
        self.routing_hosts_locked(&mut store, now).await
    }

    pub(crate) async fn monitored_hosts(
        &self,
        now: Instant,
    ) -> Result<Arc<Vec<Host>>, UpstreamError> {
        let mut store = self.store.lock().await;
        self.monitored_hosts_locked(&mut store, now).await
    }

    pub(crate) async fn subnets(&self, now: Instant) -> Result<Arc<Vec<Subnet>>, UpstreamError> {
        let mut store = self.store.lock().await;
        self.subnets_locked(&mut store, now).await
    }

    pub(crate) async fn sites(&self, now: Instant) -> Result<Arc<Vec<Site>>, UpstreamError> {
        let mut store = self.store.lock().await;

        if let Some(CachedData::Sites(sites)) = store.get(DataKind::Sites, now) {
            log::debug!("Cache hit: sites");
            return Ok(sites.clone());
        }
        let sites = Arc::new(self.accessor.fetch_sites().await?);
        store.put(CachedData::Sites(sites.clone()), now);
        Ok(sites)
    }

    pub(crate) async fn pairs_global(
        &self,
        now: Instant,
    ) -> Result<Arc<SubnetAssociations>, UpstreamError> {
        let mut store = self.store.lock().await;
        self.pairs_global_locked(&mut store, now).await
    }

    pub(crate) async fn pairs_by_subnet(
        &self,
        now: Instant,
    ) -> Result<Arc<SubnetAssociations>, UpstreamError> {
        let mut store = self.store.lock().await;
        self.pairs_by_subnet_locked(&mut store, now).await
    }

    /// Forced refresh of every preemptively covered kind, in the fixed
    /// pass order. Aborts on the first upstream failure so derived views
    /// are never rebuilt from mixed-freshness inputs; kinds not yet
    /// reached keep their previous entries.
    pub(crate) async fn refresh_all(&self, now: Instant) -> Result<(), UpstreamError> {
        let mut store = self.store.lock().await;
        for kind in DataKind::PREEMPTIVE_ORDER {
            self.refresh_kind(&mut store, kind, now).await?;
        }
        Ok(())
    }

    async fn refresh_kind(
        &self,
        store: &mut TypedResultStore,
        kind: DataKind,
        now: Instant,
    ) -> Result<(), UpstreamError> {
        let data = match kind {
            DataKind::RoutingHosts => {
                CachedData::RoutingHosts(Arc::new(self.accessor.fetch_routing_hosts().await?))
            }
            DataKind::MonitoredHosts => {
                CachedData::MonitoredHosts(Arc::new(self.accessor.fetch_monitored_hosts().await?))
            }
            DataKind::Subnets => {
                CachedData::Subnets(Arc::new(self.accessor.fetch_subnets().await?))
            }
            DataKind::Sites => CachedData::Sites(Arc::new(self.accessor.fetch_sites().await?)),
            DataKind::PairsGlobal => {
                CachedData::PairsGlobal(Arc::new(self.compute_pairs_global(store, now).await?))
            }
            DataKind::PairsBySubnet => CachedData::PairsBySubnet(Arc::new(
                self.compute_pairs_by_subnet(store, now).await?,
            )),
        };
        store.put(data, now);
        Ok(())
    }

    async fn routing_hosts_locked(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<Arc<Vec<Host>>, UpstreamError> {
        if let Some(CachedData::RoutingHosts(hosts)) = store.get(DataKind::RoutingHosts, now) {
            log::debug!("Cache hit: routing hosts");
            return Ok(hosts.clone());
        }
        let hosts = Arc::new(self.accessor.fetch_routing_hosts().await?);
        store.put(CachedData::RoutingHosts(hosts.clone()), now);
        Ok(hosts)
    }

    async fn monitored_hosts_locked(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<Arc<Vec<Host>>, UpstreamError> {
        if let Some(CachedData::MonitoredHosts(hosts)) = store.get(DataKind::MonitoredHosts, now) {
            log::debug!("Cache hit: monitored hosts");
            return Ok(hosts.clone());
        }
        let hosts = Arc::new(self.accessor.fetch_monitored_hosts().await?);
        store.put(CachedData::MonitoredHosts(hosts.clone()), now);
        Ok(hosts)
    }

    async fn subnets_locked(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<Arc<Vec<Subnet>>, UpstreamError> {
        if let Some(CachedData::Subnets(subnets)) = store.get(DataKind::Subnets, now) {
            log::debug!("Cache hit: subnets");
            return Ok(subnets.clone());
        }
        let subnets = Arc::new(self.accessor.fetch_subnets().await?);
        store.put(CachedData::Subnets(subnets.clone()), now);
        Ok(subnets)
    }

    async fn pairs_global_locked(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<Arc<SubnetAssociations>, UpstreamError> {
        if let Some(CachedData::PairsGlobal(pairs)) = store.get(DataKind::PairsGlobal, now) {
            log::debug!("Cache hit: global host pairs");
            return Ok(pairs.clone());
        }
        let pairs = Arc::new(self.compute_pairs_global(store, now).await?);
        store.put(CachedData::PairsGlobal(pairs.clone()), now);
        Ok(pairs)
    }

    async fn pairs_by_subnet_locked(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<Arc<SubnetAssociations>, UpstreamError> {
        if let Some(CachedData::PairsBySubnet(pairs)) = store.get(DataKind::PairsBySubnet, now) {
            log::debug!("Cache hit: host pairs by subnet");
            return Ok(pairs.clone());
        }
        let pairs = Arc::new(self.compute_pairs_by_subnet(store, now).await?);
        store.put(CachedData::PairsBySubnet(pairs.clone()), now);
        Ok(pairs)
    }

    /// Global pair view: prefer the accessor's direct implementation,
    /// fall back to the cross-product over cached inputs.
    async fn compute_pairs_global(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<SubnetAssociations, UpstreamError> {
        if let Some(direct) = self.accessor.fetch_unique_monitored_host_pairs_global().await {
            return direct;
        }
        let hosts = self.monitored_hosts_locked(store, now).await?;
        let subnets = self.subnets_locked(store, now).await?;
        Ok(assoc::unique_pairs_global(&hosts, &subnets))
    }

    /// By-subnet pair view, parent subnets excluded. Prefers the
    /// accessor's direct implementation.
    async fn compute_pairs_by_subnet(
        &self,
        store: &mut TypedResultStore,
        now: Instant,
    ) -> Result<SubnetAssociations, UpstreamError> {
        if let Some(direct) = self.accessor.fetch_unique_monitored_host_pairs().await {
            return direct;
        }
        let hosts = self.monitored_hosts_locked(store, now).await?;
        let subnets = self.subnets_locked(store, now).await?;
        Ok(assoc::unique_pairs(&hosts, &subnets))
    }

    #[cfg(test)]
    pub(crate) async fn entry_count(&self) -> usize {
        self.store.lock().await.len()
    }
}
