//! Time-bounded caching for HamnetDB query results
//!
//! HamnetDB queries are expensive remote calls; monitoring loops repeat
//! them constantly. [`CachedHamnetDbClient`] fronts any accessor with a
//! TTL cache: reads within the TTL are served from memory, expired reads
//! refresh through the accessor, and preemptive mode re-fetches in the
//! background shortly before entries would expire so foreground readers
//! rarely pay upstream latency.

pub mod client;
mod coordinator;
mod store;

use std::time::Duration;

/// Preemptive refresh requires at least this TTL; below it the cache
/// degrades to on-demand refresh with a logged warning.
pub const MINIMUM_PREEMPTIVE_TTL: Duration = Duration::from_secs(2 * 60);

/// The background pass fires this far ahead of entry expiry, so readers
/// do not see expiry-driven refreshes while preemptive mode is active.
pub const PREEMPTIVE_LEAD: Duration = Duration::from_secs(3);

pub use client::CachedHamnetDbClient;
