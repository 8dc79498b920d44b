//! Device inventory records
//!
//! These are the plain-data values the probing engine hands to its callers.
//! Identity and versioning of stored records belong to the inventory crate;
//! the engine only constructs them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Online state of an inventoried device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl DeviceStatus {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Unknown => "Unknown",
            DeviceStatus::Online => "Online",
            DeviceStatus::Offline => "Offline",
        }
    }

    /// Parse a stored label; anything unrecognized maps to `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label {
            "Online" => DeviceStatus::Online,
            "Offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An open TCP port observed on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPort {
    /// Port number
    pub port: u16,
    /// Catalog service label ("HTTP", "SSH", ...)
    pub service: String,
    /// Transport protocol, always "tcp" for connect-scan results
    pub protocol: String,
    /// When the port was last observed open
    pub discovered_at: DateTime<Utc>,
}

/// A discovered host and everything the scan learned about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Dotted-quad address the device was probed at
    pub address: Ipv4Addr,
    /// Reverse-DNS name, when one resolved
    pub hostname: Option<String>,
    /// Reachability at the last probe
    pub status: DeviceStatus,
    /// Open ports from the last port scan
    #[serde(default)]
    pub open_ports: Vec<OpenPort>,
    /// When the device first appeared in the inventory
    pub first_seen: Option<DateTime<Utc>>,
    /// When the device last answered a probe
    pub last_seen: Option<DateTime<Utc>>,
    /// Free-form operator notes
    pub notes: Option<String>,
}

impl Device {
    /// Create a fresh record with no scan details yet
    pub fn new(address: Ipv4Addr, status: DeviceStatus) -> Self {
        Self {
            address,
            hostname: None,
            status,
            open_ports: Vec::new(),
            first_seen: None,
            last_seen: None,
            notes: None,
        }
    }
}
