//! Typed in-memory result store
//!
//! Holds the most recent fetch result per data kind together with its
//! fetch timestamp. Freshness lives here; concurrency control lives one
//! layer up in the coordinator.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::client::models::{Host, Site, Subnet, SubnetAssociations};

/// Identifies one category of cached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DataKind {
    RoutingHosts,
    MonitoredHosts,
    Subnets,
    Sites,
    PairsGlobal,
    PairsBySubnet,
}

impl DataKind {
    /// Fixed order of the background refresh pass. The derived kinds
    /// come last so they see inputs refreshed in the same pass. Sites
    /// refresh on demand only.
    pub(crate) const PREEMPTIVE_ORDER: [DataKind; 5] = [
        DataKind::RoutingHosts,
        DataKind::MonitoredHosts,
        DataKind::Subnets,
        DataKind::PairsGlobal,
        DataKind::PairsBySubnet,
    ];
}

/// One cached result. Each kind carries exactly one value type, enforced
/// by the variant rather than by convention.
#[derive(Debug, Clone)]
pub(crate) enum CachedData {
    RoutingHosts(Arc<Vec<Host>>),
    MonitoredHosts(Arc<Vec<Host>>),
    Subnets(Arc<Vec<Subnet>>),
    Sites(Arc<Vec<Site>>),
    PairsGlobal(Arc<SubnetAssociations>),
    PairsBySubnet(Arc<SubnetAssociations>),
}

impl CachedData {
    pub(crate) fn kind(&self) -> DataKind {
        match self {
            CachedData::RoutingHosts(_) => DataKind::RoutingHosts,
            CachedData::MonitoredHosts(_) => DataKind::MonitoredHosts,
            CachedData::Subnets(_) => DataKind::Subnets,
            CachedData::Sites(_) => DataKind::Sites,
            CachedData::PairsGlobal(_) => DataKind::PairsGlobal,
            CachedData::PairsBySubnet(_) => DataKind::PairsBySubnet,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: CachedData,
    fetched_at: Instant,
}

/// Per-kind store of the most recent fetch results
#[derive(Debug)]
pub(crate) struct TypedResultStore {
    ttl: Duration,
    entries: HashMap<DataKind, CacheEntry>,
}

impl TypedResultStore {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Current entry for `kind`, if present and not older than the TTL
    /// at `now`. An expired entry is indistinguishable from a missing
    /// one; expired data is never returned.
    pub(crate) fn get(&self, kind: DataKind, now: Instant) -> Option<&CachedData> {
        let entry = self.entries.get(&kind)?;
        if now.saturating_duration_since(entry.fetched_at) <= self.ttl {
            Some(&entry.data)
        } else {
            None
        }
    }

    /// Replace the entry for the data's kind unconditionally.
    pub(crate) fn put(&mut self, data: CachedData, fetched_at: Instant) {
        self.entries.insert(data.kind(), CacheEntry { data, fetched_at });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
