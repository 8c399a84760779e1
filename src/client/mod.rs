//! HamnetDB upstream accessors

use async_trait::async_trait;

use crate::error::UpstreamError;

pub mod json;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use json::HamnetDbClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockHamnetDbClient;
pub use models::{Host, Site, Subnet, SubnetAssociations};

/// Upstream HamnetDB data source.
///
/// The cache layer owns no knowledge of what stands behind this trait
/// (REST export, SQL mirror, fixture). Implementations are expected to
/// bound their own I/O: timeouts belong at this boundary, not in the
/// cache, where a hung fetch would stall every consumer.
#[async_trait]
pub trait HamnetDbApi: Send + Sync {
    /// Fetch all hosts participating in mesh routing
    async fn fetch_routing_hosts(&self) -> Result<Vec<Host>, UpstreamError>;

    /// Fetch all hosts with monitoring enabled
    async fn fetch_monitored_hosts(&self) -> Result<Vec<Host>, UpstreamError>;

    /// Fetch all subnets
    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, UpstreamError>;

    /// Fetch all sites
    async fn fetch_sites(&self) -> Result<Vec<Site>, UpstreamError>;

    /// Direct implementation of the by-subnet unique-pair view, if the
    /// accessor has one.
    ///
    /// `None` means unsupported; the cache then computes the view from
    /// the monitored-host and subnet tables itself.
    async fn fetch_unique_monitored_host_pairs(
        &self,
    ) -> Option<Result<SubnetAssociations, UpstreamError>> {
        None
    }

    /// Direct implementation of the global unique-pair view, if the
    /// accessor has one.
    async fn fetch_unique_monitored_host_pairs_global(
        &self,
    ) -> Option<Result<SubnetAssociations, UpstreamError>> {
        None
    }
}
