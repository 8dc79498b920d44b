//! Ping sweep - concurrent reachability probing across a host range
//!
//! One probe task is spawned per address in the range; a semaphore caps how
//! many are in flight at once. The coordinator joins every task before
//! returning, so partial results never escape, and hosts that stay silent
//! are simply absent from the result.

use crate::probe::Pinger;
use lanscout_core::SweepRange;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Observer fired once per confirmed live host, from inside probe tasks.
/// Not part of the return-value contract; ordering is unspecified.
pub type HostFoundFn = dyn Fn(Ipv4Addr) + Send + Sync;

/// Sweep configuration
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Timeout per reachability probe
    pub timeout: Duration,
    /// Maximum concurrent in-flight probes. The default covers a full /24,
    /// preserving unbounded-fan-out behavior; lower it for constrained
    /// environments.
    pub max_in_flight: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            max_in_flight: 256,
        }
    }
}

/// Ping-sweep coordinator, generic over the reachability prober.
pub struct Sweeper<P> {
    pinger: Arc<P>,
    config: SweepConfig,
    on_host_found: Option<Arc<HostFoundFn>>,
}

impl<P: Pinger + 'static> Sweeper<P> {
    /// Create a sweeper with default configuration
    pub fn new(pinger: P) -> Self {
        Self::with_config(pinger, SweepConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(pinger: P, config: SweepConfig) -> Self {
        Self {
            pinger: Arc::new(pinger),
            config,
            on_host_found: None,
        }
    }

    /// Register an observer fired as each live host is confirmed
    pub fn on_host_found(
        mut self,
        callback: impl Fn(Ipv4Addr) + Send + Sync + 'static,
    ) -> Self {
        self.on_host_found = Some(Arc::new(callback));
        self
    }

    /// Probe every address in `range` concurrently and return the subset
    /// that answered, in ascending order.
    ///
    /// Every address is attempted and every probe is awaited; an empty
    /// result means no host answered, not that the sweep failed.
    pub async fn sweep(&self, range: &SweepRange) -> Vec<Ipv4Addr> {
        info!("Starting sweep of {} ({} hosts)", range, range.host_count());

        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut handles = Vec::with_capacity(range.host_count());

        for addr in range.addresses() {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let pinger = self.pinger.clone();
            let probe_timeout = self.config.timeout;
            let callback = self.on_host_found.clone();

            handles.push(tokio::spawn(async move {
                let alive = pinger.probe(IpAddr::V4(addr), probe_timeout).await;
                drop(permit);

                if alive {
                    debug!("Found active host: {}", addr);
                    if let Some(cb) = &callback {
                        cb(addr);
                    }
                    Some(addr)
                } else {
                    None
                }
            }));
        }

        // Join barrier: results are collected from task handles, so
        // concurrent completions cannot lose or duplicate entries.
        let mut live = Vec::new();
        for handle in handles {
            if let Ok(Some(addr)) = handle.await {
                live.push(addr);
            }
        }

        live.sort_unstable();
        info!("Sweep complete, {} hosts responding", live.len());
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Test double: answers for a fixed set of hosts and counts attempts.
    struct SimulatedResponder {
        live: HashSet<Ipv4Addr>,
        attempts: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SimulatedResponder {
        fn new(live_hosts: &[Ipv4Addr]) -> Self {
            Self {
                live: live_hosts.iter().copied().collect(),
                attempts: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Pinger for SimulatedResponder {
        async fn probe(&self, ip: IpAddr, _probe_timeout: Duration) -> bool {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match ip {
                IpAddr::V4(v4) => self.live.contains(&v4),
                IpAddr::V6(_) => false,
            }
        }
    }

    fn host(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, last)
    }

    #[tokio::test]
    async fn test_sweep_returns_exact_live_set() {
        let live = [host(5), host(77), host(200)];
        let range = SweepRange::new("10.0.0", 1, 254).unwrap();

        // Repeat to catch nondeterministic aggregation bugs.
        for _ in 0..3 {
            let sweeper = Sweeper::new(SimulatedResponder::new(&live));
            let found = sweeper.sweep(&range).await;
            assert_eq!(found, vec![host(5), host(77), host(200)]);
        }
    }

    #[tokio::test]
    async fn test_sweep_attempts_every_host() {
        let range = SweepRange::new("10.0.0", 10, 60).unwrap();
        let sweeper = Sweeper::new(SimulatedResponder::new(&[]));

        let found = sweeper.sweep(&range).await;
        assert!(found.is_empty());
        assert_eq!(
            sweeper.pinger.attempts.load(Ordering::SeqCst),
            range.host_count()
        );
    }

    #[tokio::test]
    async fn test_single_host_range_issues_one_probe() {
        let range = SweepRange::new("10.0.0", 9, 9).unwrap();
        let sweeper = Sweeper::new(SimulatedResponder::new(&[host(9)]));

        let found = sweeper.sweep(&range).await;
        assert_eq!(found, vec![host(9)]);
        assert_eq!(sweeper.pinger.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sweep_respects_in_flight_cap() {
        let range = SweepRange::new("10.0.0", 1, 40).unwrap();
        let config = SweepConfig {
            timeout: Duration::from_secs(1),
            max_in_flight: 4,
        };
        let sweeper = Sweeper::with_config(SimulatedResponder::new(&[]), config);

        sweeper.sweep(&range).await;
        assert_eq!(
            sweeper.pinger.attempts.load(Ordering::SeqCst),
            range.host_count()
        );
        assert!(sweeper.pinger.max_in_flight.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_progress_callback_fires_per_live_host() {
        let live = [host(3), host(14)];
        let range = SweepRange::new("10.0.0", 1, 20).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_ref = seen.clone();
        let sweeper = Sweeper::new(SimulatedResponder::new(&live))
            .on_host_found(move |ip| seen_ref.lock().unwrap().push(ip));

        sweeper.sweep(&range).await;

        let mut observed = seen.lock().unwrap().clone();
        observed.sort_unstable();
        assert_eq!(observed, vec![host(3), host(14)]);
    }
}
