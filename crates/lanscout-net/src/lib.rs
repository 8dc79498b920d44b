//! LANScout Net - Host discovery, port scanning, service catalog
//!
//! This crate provides the concurrent probing engine:
//! - Ping sweep over a contiguous host range (ICMP echo fan-out)
//! - TCP connect scanning over the common-services port catalog
//! - Best-effort reverse DNS resolution
//! - Static port -> service-name catalog
//!
//! Probes are best-effort: a host or port that fails to answer within the
//! timeout is reported as absent, never as an error. Coordinators fan one
//! task out per unit of work and join every task before returning.

pub mod port_scan;
pub mod probe;
pub mod resolve;
pub mod services;
pub mod sweep;

pub use port_scan::{PortScanConfig, PortScanner};
pub use probe::{probe_port, IcmpPinger, Pinger};
pub use resolve::resolve_hostname;
pub use services::{service_name, COMMON_PORTS};
pub use sweep::{SweepConfig, Sweeper};
