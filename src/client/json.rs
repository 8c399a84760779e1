//! HamnetDB JSON export client
//!
//! Fetches the public HamnetDB JSON export (`csv.cgi?tab=...&json=1`).
//! Routing and monitored host sets are filtered from the host table
//! client-side; the export has no server-side filter parameters.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::HamnetDbApi;
use super::models::{Host, Site, Subnet};
use crate::error::UpstreamError;

/// Public HamnetDB base URL
const BASE_URL: &str = "https://hamnetdb.net";

/// Upstream calls are bounded here; the cache layer has no timeout of
/// its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HamnetDB asks consumers to poll gently.
const RATE_LIMIT_PER_MINUTE: u32 = 30;

/// Client for the HamnetDB JSON export
pub struct HamnetDbClient {
    http: HttpClient,
    base_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HamnetDbClient {
    /// Create a client against the public hamnetdb.net service
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_base_url(BASE_URL)
    }

    /// Create a client against a specific service URL (mirrors, testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let quota = Quota::per_minute(NonZeroU32::new(RATE_LIMIT_PER_MINUTE).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            base_url: base_url.into(),
            rate_limiter,
        })
    }

    /// Fetch and decode one export table
    async fn fetch_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, UpstreamError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/csv.cgi?tab={}&json=1", self.base_url, table);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(UpstreamError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => response.json::<Vec<T>>().await.map_err(|e| {
                UpstreamError::InvalidResponse(format!("Failed to parse {} table: {}", table, e))
            }),
            _ => Err(UpstreamError::Status(status.as_u16())),
        }
    }

    async fn fetch_hosts(&self) -> Result<Vec<Host>, UpstreamError> {
        self.fetch_table("host").await
    }
}

#[async_trait]
impl HamnetDbApi for HamnetDbClient {
    async fn fetch_routing_hosts(&self) -> Result<Vec<Host>, UpstreamError> {
        let hosts = self.fetch_hosts().await?;
        Ok(hosts
            .into_iter()
            .filter(|h| h.routing && !h.deleted)
            .collect())
    }

    async fn fetch_monitored_hosts(&self) -> Result<Vec<Host>, UpstreamError> {
        let hosts = self.fetch_hosts().await?;
        Ok(hosts
            .into_iter()
            .filter(|h| h.monitored && !h.deleted && !h.no_ping)
            .collect())
    }

    async fn fetch_subnets(&self) -> Result<Vec<Subnet>, UpstreamError> {
        self.fetch_table("subnet").await
    }

    async fn fetch_sites(&self) -> Result<Vec<Site>, UpstreamError> {
        self.fetch_table("site").await
    }
}
