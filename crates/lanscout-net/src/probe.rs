//! Single-probe primitives - ICMP reachability and TCP connect checks
//!
//! Every failure mode at this boundary (timeout, refusal, unreachable
//! network, missing privileges) collapses to a negative result. An
//! unanswered probe is a normal outcome, not an error, so nothing here
//! returns `Result`.

use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use surge_ping::{Client, Config as PingConfig, PingIdentifier, PingSequence};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

/// Reachability probe abstraction.
///
/// Sweeps are generic over this trait so they can run against simulated
/// responders in tests instead of a live network.
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Probe a single host; true when it answered within the timeout.
    async fn probe(&self, ip: IpAddr, probe_timeout: Duration) -> bool;
}

/// ICMP echo prober backed by surge-ping.
///
/// Opening the ICMP socket requires elevated privileges on most systems.
/// When the socket cannot be opened the prober stays usable but reports
/// every host unreachable, matching the rule that probe failures are
/// negative results rather than errors.
pub struct IcmpPinger {
    client: Option<Client>,
}

impl IcmpPinger {
    pub fn new() -> Self {
        let client = match Client::new(&PingConfig::default()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(
                    "Failed to open ICMP socket: {}. Reachability probes will report all hosts down.",
                    e
                );
                None
            }
        };
        Self { client }
    }
}

impl Default for IcmpPinger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Pinger for IcmpPinger {
    async fn probe(&self, ip: IpAddr, probe_timeout: Duration) -> bool {
        let client = match &self.client {
            Some(client) => client,
            None => return false,
        };

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(probe_timeout);

        // The outer timeout covers pathological cases where the pinger's own
        // timeout does not fire.
        match timeout(probe_timeout, pinger.ping(PingSequence(0), &[])).await {
            Ok(Ok((_packet, rtt))) => {
                debug!("Host {} answered echo in {:?}", ip, rtt);
                true
            }
            Ok(Err(_)) | Err(_) => {
                trace!("Host {} did not answer within {:?}", ip, probe_timeout);
                false
            }
        }
    }
}

/// Attempt a TCP handshake against `ip:port`, bounded by `probe_timeout`.
///
/// The connect attempt races the timer and resolves as soon as either
/// finishes, so a slow OS-level connect timeout cannot stretch the probe.
/// A successful stream is closed immediately; refusals, timeouts, and
/// unreachable errors all report the port as closed.
pub async fn probe_port(ip: IpAddr, port: u16, probe_timeout: Duration) -> bool {
    let addr = SocketAddr::new(ip, port);
    trace!("TCP probe {}", addr);

    match timeout(probe_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            debug!("Port {}:{} is open", ip, port);
            true
        }
        Ok(Err(e)) => {
            trace!("Port {}:{} closed: {}", ip, port, e);
            false
        }
        Err(_) => {
            trace!("Port {}:{} timed out", ip, port);
            false
        }
    }
}
