//! Static catalog of commonly probed TCP services

/// The well-known service ports probed by default, in ascending order.
/// Immutable process-wide; callers wanting a different set pass their own
/// list to the port scanner.
pub const COMMON_PORTS: &[u16] = &[
    21, 22, 23, 25, 53, 80, 110, 143, 443, 445, 3306, 3389, 5432, 8080,
];

/// Human-readable label for a cataloged port, "Unknown" for anything else.
/// Total function: no I/O, no failure mode.
pub fn service_name(port: u16) -> &'static str {
    match port {
        21 => "FTP",
        22 => "SSH",
        23 => "Telnet",
        25 => "SMTP",
        53 => "DNS",
        80 => "HTTP",
        110 => "POP3",
        143 => "IMAP",
        443 => "HTTPS",
        445 => "SMB",
        3306 => "MySQL",
        3389 => "RDP",
        5432 => "PostgreSQL",
        8080 => "HTTP-Alt",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_services() {
        assert_eq!(service_name(80), "HTTP");
        assert_eq!(service_name(22), "SSH");
        assert_eq!(service_name(443), "HTTPS");
        assert_eq!(service_name(5432), "PostgreSQL");
    }

    #[test]
    fn test_unknown_port() {
        assert_eq!(service_name(9999), "Unknown");
        assert_eq!(service_name(0), "Unknown");
        assert_eq!(service_name(65535), "Unknown");
    }

    #[test]
    fn test_catalog_is_exhaustive() {
        for &port in COMMON_PORTS {
            assert_ne!(service_name(port), "Unknown", "port {} has no label", port);
        }
    }

    #[test]
    fn test_catalog_sorted_and_sized() {
        assert_eq!(COMMON_PORTS.len(), 14);
        assert!(COMMON_PORTS.windows(2).all(|w| w[0] < w[1]));
    }
}
