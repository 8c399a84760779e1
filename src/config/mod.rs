//! Settings for the cached HamnetDB accessor

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::MINIMUM_PREEMPTIVE_TTL;
use crate::error::{ConfigError, Result};

fn default_ttl() -> Duration {
    // 5 minutes
    Duration::from_secs(5 * 60)
}

fn default_base_url() -> String {
    "https://hamnetdb.net".to_string()
}

/// Cache behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum age at which a cached entry is still served
    #[serde(rename = "ttl_secs", with = "duration_secs", default = "default_ttl")]
    pub ttl: Duration,

    /// Refresh in the background ahead of expiry
    #[serde(default)]
    pub preemptive: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            preemptive: false,
        }
    }
}

impl CacheSettings {
    /// Apply the preemptive TTL floor.
    ///
    /// Preemptive refresh with a very short TTL would hammer the
    /// upstream service; below the floor the cache falls back to
    /// on-demand refresh and logs a warning instead of failing
    /// construction.
    pub fn normalized(&self) -> CacheSettings {
        if self.preemptive && self.ttl < MINIMUM_PREEMPTIVE_TTL {
            log::warn!(
                "Preemptive refresh requested with TTL {:?} below the {:?} floor, \
                 falling back to on-demand refresh",
                self.ttl,
                MINIMUM_PREEMPTIVE_TTL
            );
            return CacheSettings {
                ttl: self.ttl,
                preemptive: false,
            };
        }
        self.clone()
    }
}

/// HamnetDB service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessorSettings {
    /// Base URL of the HamnetDB service
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for AccessorSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Top-level settings file (YAML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HamnetDB service settings
    #[serde(default)]
    pub hamnetdb: AccessorSettings,

    /// Cache behavior
    #[serde(default)]
    pub cache: CacheSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let settings: Settings = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(settings)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
