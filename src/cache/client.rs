//! Cached HamnetDB facade
//!
//! Wraps any [`HamnetDbApi`] accessor with the TTL cache and, in
//! preemptive mode, the background refresh task.

use std::sync::Arc;
use std::time::Duration;

use ipnetwork::IpNetwork;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::PREEMPTIVE_LEAD;
use super::coordinator::RefreshCoordinator;
use crate::assoc;
use crate::client::HamnetDbApi;
use crate::client::models::{Host, Site, Subnet, SubnetAssociations};
use crate::config::CacheSettings;
use crate::error::{Error, Result};

/// Cached facade over a HamnetDB accessor.
///
/// Query methods serve the store while entries are fresh and refresh
/// through the accessor otherwise. All queries and refreshes are
/// serialized by one coarse lock; a query issued while a background pass
/// runs simply waits for it. Each query establishes one snapshot time at
/// entry and uses it for every freshness check it makes.
pub struct CachedHamnetDbClient<C: HamnetDbApi + 'static> {
    coordinator: Arc<RefreshCoordinator<C>>,
    preemptive: Option<PreemptiveRefresh>,
}

/// Handle to the background refresh task
struct PreemptiveRefresh {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
    /// Held by a running pass; acquired on close so no pass survives it.
    gate: Arc<Mutex<()>>,
}

impl<C: HamnetDbApi + 'static> CachedHamnetDbClient<C> {
    /// Create a cache over `accessor`.
    ///
    /// With `preemptive` set and a TTL of at least
    /// [`MINIMUM_PREEMPTIVE_TTL`](super::MINIMUM_PREEMPTIVE_TTL), a
    /// background task re-fetches every covered kind ahead of expiry.
    /// Shorter TTLs degrade to pull-only mode with a logged warning.
    pub fn new(accessor: C, settings: CacheSettings) -> Self {
        let settings = settings.normalized();
        let coordinator = Arc::new(RefreshCoordinator::new(accessor, settings.ttl));
        let preemptive = settings
            .preemptive
            .then(|| Self::spawn_preemptive(coordinator.clone(), settings.ttl - PREEMPTIVE_LEAD));

        Self {
            coordinator,
            preemptive,
        }
    }

    fn spawn_preemptive(
        coordinator: Arc<RefreshCoordinator<C>>,
        period: Duration,
    ) -> PreemptiveRefresh {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let gate = Arc::new(Mutex::new(()));
        let pass_gate = gate.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately; queries populate the
            // store on demand until the first full period elapses
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => match pass_gate.clone().try_lock_owned() {
                        Ok(guard) => {
                            let coordinator = coordinator.clone();
                            tokio::spawn(async move {
                                let _guard = guard;
                                if let Err(err) = coordinator.refresh_all(Instant::now()).await {
                                    log::warn!("Preemptive refresh pass aborted: {}", err);
                                }
                            });
                        }
                        Err(_) => {
                            log::warn!(
                                "Previous preemptive refresh pass still running, skipping this one"
                            );
                        }
                    },
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        PreemptiveRefresh {
            shutdown,
            handle,
            gate,
        }
    }

    /// All hosts participating in mesh routing.
    pub async fn routing_hosts(&self) -> Result<Arc<Vec<Host>>> {
        Ok(self.coordinator.routing_hosts(Instant::now()).await?)
    }

    /// All hosts with monitoring enabled.
    pub async fn monitored_hosts(&self) -> Result<Arc<Vec<Host>>> {
        Ok(self.coordinator.monitored_hosts(Instant::now()).await?)
    }

    /// All subnets.
    pub async fn subnets(&self) -> Result<Arc<Vec<Subnet>>> {
        Ok(self.coordinator.subnets(Instant::now()).await?)
    }

    /// All sites.
    pub async fn sites(&self) -> Result<Arc<Vec<Site>>> {
        Ok(self.coordinator.sites(Instant::now()).await?)
    }

    /// Unique monitored host pairs, keyed by the most specific subnets
    /// contained in or equal to `filter`.
    ///
    /// Fails with [`Error::InvalidArgument`] if `filter` has host bits
    /// set, before any cache state is touched.
    pub async fn unique_monitored_host_pairs(
        &self,
        filter: IpNetwork,
    ) -> Result<SubnetAssociations> {
        if filter.ip() != filter.network() {
            return Err(Error::InvalidArgument(format!(
                "subnet filter {} has host bits set",
                filter
            )));
        }

        let pairs = self.coordinator.pairs_by_subnet(Instant::now()).await?;
        Ok(assoc::restrict_to(&pairs, filter))
    }

    /// Unique monitored host pairs over the whole dataset, without
    /// parent-subnet exclusion.
    pub async fn unique_monitored_host_pairs_global(&self) -> Result<Arc<SubnetAssociations>> {
        Ok(self.coordinator.pairs_global(Instant::now()).await?)
    }

    /// Whether the background refresh task is active.
    pub fn is_preemptive(&self) -> bool {
        self.preemptive.is_some()
    }

    /// The wrapped accessor.
    pub fn accessor(&self) -> &C {
        self.coordinator.accessor()
    }

    /// Stop the background refresh task.
    ///
    /// Waits for the ticker to exit and for any in-flight pass to
    /// finish; after return nothing touches the store in the background.
    /// Idempotent, and a no-op for pull-only caches.
    pub async fn close(&mut self) {
        if let Some(preemptive) = self.preemptive.take() {
            let _ = preemptive.shutdown.send(true);
            let _ = preemptive.handle.await;
            let _ = preemptive.gate.lock().await;
        }
    }
}

impl<C: HamnetDbApi + 'static> Drop for CachedHamnetDbClient<C> {
    fn drop(&mut self) {
        // best effort for callers that never close(); close() is the
        // deterministic path
        if let Some(preemptive) = &self.preemptive {
            preemptive.handle.abort();
        }
    }
}
