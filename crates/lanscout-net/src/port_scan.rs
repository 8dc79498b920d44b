//! Port scanning - concurrent TCP connect probes over a port list
//!
//! Same fan-out discipline as the ping sweep, scoped to one target host:
//! one task per port, a semaphore cap, and a join barrier before results
//! are returned.

use crate::probe::probe_port;
use crate::services::COMMON_PORTS;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Port scanner configuration
#[derive(Debug, Clone)]
pub struct PortScanConfig {
    /// Timeout per port probe
    pub timeout: Duration,
    /// Maximum concurrent port probes
    pub max_in_flight: usize,
}

impl Default for PortScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            max_in_flight: 64,
        }
    }
}

/// Port scanner engine
pub struct PortScanner {
    config: PortScanConfig,
}

impl PortScanner {
    /// Create a new port scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: PortScanConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: PortScanConfig) -> Self {
        Self { config }
    }

    /// Probe every port in `ports` concurrently and return the open subset
    /// in ascending order.
    ///
    /// An empty port list returns empty without touching the network. Ports
    /// that refuse, time out, or error are absent from the result; an empty
    /// result is a valid outcome, not a failure.
    pub async fn scan(&self, target: IpAddr, ports: &[u16]) -> Vec<u16> {
        if ports.is_empty() {
            return Vec::new();
        }

        info!("Scanning {} ports on {}", ports.len(), target);

        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut handles = Vec::with_capacity(ports.len());

        for &port in ports {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let probe_timeout = self.config.timeout;

            handles.push(tokio::spawn(async move {
                let open = probe_port(target, port, probe_timeout).await;
                drop(permit);
                if open {
                    Some(port)
                } else {
                    None
                }
            }));
        }

        let mut open_ports = Vec::new();
        for handle in handles {
            if let Ok(Some(port)) = handle.await {
                open_ports.push(port);
            }
        }

        open_ports.sort_unstable();
        debug!("{} of {} probed ports open on {}", open_ports.len(), ports.len(), target);
        open_ports
    }

    /// Scan the common-services catalog
    pub async fn scan_common(&self, target: IpAddr) -> Vec<u16> {
        self.scan(target, COMMON_PORTS).await
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Instant;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_empty_port_list_short_circuits() {
        let scanner = PortScanner::new();
        let started = Instant::now();

        let open = scanner.scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &[]).await;

        assert!(open.is_empty());
        // No probes were issued, so this returns immediately.
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_scan_finds_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();

        // Bind and drop a second socket to get a known-closed port.
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let scanner = PortScanner::new();
        let open = scanner
            .scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &[open_port, closed_port])
            .await;

        assert!(open.contains(&open_port));
        assert!(!open.contains(&closed_port));
    }

    #[tokio::test]
    async fn test_results_sorted_ascending() {
        let a = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let b = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port_a = a.local_addr().unwrap().port();
        let port_b = b.local_addr().unwrap().port();

        let scanner = PortScanner::new();
        // Probe in descending order; results still come back ascending.
        let mut probed = vec![port_a.max(port_b), port_a.min(port_b)];
        let open = scanner
            .scan(IpAddr::V4(Ipv4Addr::LOCALHOST), &probed)
            .await;

        probed.sort_unstable();
        assert_eq!(open, probed);
    }

    #[tokio::test]
    async fn test_silent_host_bounded_by_one_timeout() {
        // TEST-NET-1: nothing answers. Fourteen sequential probes would
        // take ~14x the timeout; concurrent execution must finish in
        // roughly one timeout period.
        let config = PortScanConfig {
            timeout: Duration::from_millis(500),
            max_in_flight: 64,
        };
        let scanner = PortScanner::with_config(config);

        let started = Instant::now();
        let open = scanner
            .scan_common(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))
            .await;

        assert!(open.is_empty());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
