//! Cached accessor layer for HamnetDB, the database behind the HAMNET
//! amateur-radio IP mesh.
//!
//! Monitoring the mesh means repeatedly asking HamnetDB for hosts,
//! subnets, and sites: expensive, failure-prone remote queries. This
//! crate fronts any [`HamnetDbApi`] accessor with a TTL cache
//! ([`CachedHamnetDbClient`]) that serves repeated reads from memory,
//! optionally re-fetches in the background ahead of expiry, and derives
//! the point-to-point link views (unique monitored host pairs per
//! subnet) that link monitoring consumes.
//!
//! ```no_run
//! use hamnetdb::{CacheSettings, CachedHamnetDbClient, HamnetDbClient};
//!
//! # async fn run() -> hamnetdb::Result<()> {
//! let accessor = HamnetDbClient::new()?;
//! let cache = CachedHamnetDbClient::new(accessor, CacheSettings::default());
//!
//! let hosts = cache.monitored_hosts().await?;
//! let pairs = cache.unique_monitored_host_pairs_global().await?;
//! # Ok(())
//! # }
//! ```

pub mod assoc;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;

pub use cache::CachedHamnetDbClient;
pub use client::models::{Host, Site, Subnet, SubnetAssociations};
pub use client::{HamnetDbApi, HamnetDbClient};
pub use config::{CacheSettings, Settings};
pub use error::{Error, Result, UpstreamError};
