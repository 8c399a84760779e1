//! HamnetDB record models
//!
//! Maps the HamnetDB JSON export (`csv.cgi?tab=...&json=1`). The export
//! encodes boolean flags as 0/1 integers and timestamps as naive
//! `YYYY-MM-DD HH:MM:SS` strings; the `de` helpers tolerate both forms.

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::NaiveDateTime;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

/// Monitored hosts keyed by the subnet that contains them.
///
/// `BTreeMap` keeps the mapping deterministically ordered by CIDR.
pub type SubnetAssociations = BTreeMap<Subnet, Vec<Host>>;

/// Host record from the HamnetDB host table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Host address
    pub ip: IpAddr,

    /// Fully qualified host name
    pub name: String,

    /// Callsign of the site the host is installed at
    #[serde(default)]
    pub site: String,

    /// Host type as entered in HamnetDB (router, service, ...)
    #[serde(default)]
    pub typ: String,

    /// Host participates in mesh routing
    #[serde(default, deserialize_with = "de::flag")]
    pub routing: bool,

    /// Monitoring requested for this host
    #[serde(default, rename = "monitors", deserialize_with = "de::flag")]
    pub monitored: bool,

    /// Host must not be pinged
    #[serde(default, deserialize_with = "de::flag")]
    pub no_ping: bool,

    /// Record is marked deleted
    #[serde(default, deserialize_with = "de::flag")]
    pub deleted: bool,

    /// Last edit timestamp
    #[serde(default, deserialize_with = "de::edited")]
    pub edited: Option<NaiveDateTime>,
}

impl Host {
    /// Create a host record with all flags cleared.
    pub fn new(ip: IpAddr, name: impl Into<String>) -> Self {
        Self {
            ip,
            name: name.into(),
            site: String::new(),
            typ: String::new(),
            routing: false,
            monitored: false,
            no_ping: false,
            deleted: false,
            edited: None,
        }
    }
}

/// Subnet record from the HamnetDB subnet table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    /// Network in CIDR notation
    #[serde(rename = "ip")]
    pub cidr: IpNetwork,

    /// Subnet type as entered in HamnetDB (backbone, user network, ...)
    #[serde(default)]
    pub typ: String,

    /// Last edit timestamp
    #[serde(default, deserialize_with = "de::edited")]
    pub edited: Option<NaiveDateTime>,
}

impl Subnet {
    /// Create a subnet record for a bare network.
    pub fn new(cidr: IpNetwork) -> Self {
        Self {
            cidr,
            typ: String::new(),
            edited: None,
        }
    }

    /// Whether `addr` lies inside this subnet.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.cidr.contains(addr)
    }
}

// Subnet identity is its CIDR; metadata does not participate, so subnets
// can key association maps.
impl PartialEq for Subnet {
    fn eq(&self, other: &Self) -> bool {
        self.cidr == other.cidr
    }
}

impl Eq for Subnet {}

impl PartialOrd for Subnet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Subnet {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cidr.cmp(&other.cidr)
    }
}

impl std::hash::Hash for Subnet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cidr.hash(state);
    }
}

/// Site record from the HamnetDB site table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Site callsign
    pub callsign: String,

    /// Human-readable site name
    #[serde(default)]
    pub name: String,

    /// Latitude in decimal degrees
    #[serde(default, rename = "lat")]
    pub latitude: f64,

    /// Longitude in decimal degrees
    #[serde(default, rename = "lon")]
    pub longitude: f64,

    /// Elevation above sea level in meters
    #[serde(default, rename = "alt")]
    pub elevation: Option<f64>,

    /// Site is no longer on air
    #[serde(default, deserialize_with = "de::flag")]
    pub inactive: bool,

    /// Last edit timestamp
    #[serde(default, deserialize_with = "de::edited")]
    pub edited: Option<NaiveDateTime>,
}

pub(crate) mod de {
    use chrono::NaiveDateTime;
    use serde::Deserialize;
    use serde::de::{Deserializer, Error as _, Unexpected, Visitor};

    /// Accept both native booleans and the export's 0/1 integers.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = bool;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a boolean or a 0/1 integer")
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<bool, E> {
                Ok(v != 0)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<bool, E> {
                Ok(v != 0)
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }

    const EDITED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Edit timestamps are naive local strings; blank means never edited.
    pub fn edited<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => NaiveDateTime::parse_from_str(s, EDITED_FORMAT)
                .map(Some)
                .map_err(|_| D::Error::invalid_value(Unexpected::Str(s), &"YYYY-MM-DD HH:MM:SS")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_decodes_integer_flags() {
        let json = r#"{
            "ip": "44.148.0.1",
            "name": "router.db0abc.ampr.org",
            "site": "db0abc",
            "typ": "router",
            "routing": 1,
            "monitors": 1,
            "no_ping": 0,
            "deleted": 0,
            "edited": "2024-03-17 09:41:00"
        }"#;

        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.ip, "44.148.0.1".parse::<IpAddr>().unwrap());
        assert!(host.routing);
        assert!(host.monitored);
        assert!(!host.no_ping);
        assert!(!host.deleted);
        assert!(host.edited.is_some());
    }

    #[test]
    fn test_host_tolerates_missing_fields() {
        let json = r#"{"ip": "44.148.0.2", "name": "ap.db0abc.ampr.org"}"#;

        let host: Host = serde_json::from_str(json).unwrap();
        assert!(!host.monitored);
        assert!(host.site.is_empty());
        assert_eq!(host.edited, None);
    }

    #[test]
    fn test_host_rejects_malformed_edited() {
        let json = r#"{"ip": "44.148.0.2", "name": "x", "edited": "17.03.2024"}"#;

        assert!(serde_json::from_str::<Host>(json).is_err());
    }

    #[test]
    fn test_subnet_decodes_cidr() {
        let json = r#"{"ip": "44.148.0.0/27", "typ": "backbone"}"#;

        let subnet: Subnet = serde_json::from_str(json).unwrap();
        assert_eq!(subnet.cidr, "44.148.0.0/27".parse::<IpNetwork>().unwrap());
        assert_eq!(subnet.typ, "backbone");
    }

    #[test]
    fn test_subnet_identity_is_cidr() {
        let mut a = Subnet::new("44.148.0.0/27".parse().unwrap());
        a.typ = "backbone".to_string();
        let b = Subnet::new("44.148.0.0/27".parse().unwrap());

        assert_eq!(a, b);

        let c = Subnet::new("44.148.0.32/27".parse().unwrap());
        assert!(a < c);
    }

    #[test]
    fn test_site_decodes_coordinates() {
        let json = r#"{
            "callsign": "db0abc",
            "name": "Aachen",
            "lat": 50.7766,
            "lon": 6.0834,
            "alt": 264.0,
            "inactive": 0
        }"#;

        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.callsign, "db0abc");
        assert!(site.elevation.is_some());
        assert!(!site.inactive);
    }
}
