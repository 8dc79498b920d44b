//! LANScout Export - CSV and JSON rendering of inventory records
//!
//! Pure consumers of the already-computed device records; no probing or
//! storage concerns here.

use lanscout_core::{Device, Error, Result};
use std::path::Path;
use tracing::info;

const CSV_HEADER: [&str; 7] = [
    "IP Address",
    "Hostname",
    "Status",
    "Open Ports",
    "First Seen",
    "Last Seen",
    "Notes",
];

/// Render devices as CSV text
pub fn to_csv(devices: &[Device]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::Export(format!("Failed to write CSV header: {}", e)))?;

    for device in devices {
        let ports = device
            .open_ports
            .iter()
            .map(|p| p.port.to_string())
            .collect::<Vec<_>>()
            .join(";");

        writer
            .write_record([
                device.address.to_string(),
                device
                    .hostname
                    .clone()
                    .unwrap_or_else(|| String::from("Unknown")),
                device.status.to_string(),
                ports,
                format_stamp(device.first_seen),
                format_stamp(device.last_seen),
                device.notes.clone().unwrap_or_default(),
            ])
            .map_err(|e| Error::Export(format!("Failed to write CSV row: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Export(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Export(format!("CSV was not UTF-8: {}", e)))
}

/// Write devices to a CSV file
pub fn write_csv(devices: &[Device], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_csv(devices)?)?;
    info!("Exported {} devices to {}", devices.len(), path.display());
    Ok(())
}

/// Render devices as pretty-printed JSON
pub fn to_json(devices: &[Device]) -> Result<String> {
    Ok(serde_json::to_string_pretty(devices)?)
}

/// Write devices to a JSON file
pub fn write_json(devices: &[Device], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_json(devices)?)?;
    info!("Exported {} devices to {}", devices.len(), path.display());
    Ok(())
}

fn format_stamp(stamp: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match stamp {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::from("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lanscout_core::{DeviceStatus, OpenPort};
    use std::net::Ipv4Addr;

    fn fixture() -> Vec<Device> {
        let mut device = Device::new(Ipv4Addr::new(10, 0, 0, 7), DeviceStatus::Online);
        device.hostname = Some(String::from("web.lan"));
        device.first_seen = Some(Utc::now());
        device.last_seen = Some(Utc::now());
        for port in [80u16, 443] {
            device.open_ports.push(OpenPort {
                port,
                service: String::from(if port == 80 { "HTTP" } else { "HTTPS" }),
                protocol: String::from("tcp"),
                discovered_at: Utc::now(),
            });
        }
        vec![device, Device::new(Ipv4Addr::new(10, 0, 0, 8), DeviceStatus::Offline)]
    }

    #[test]
    fn test_csv_shape() {
        let csv = to_csv(&fixture()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "IP Address,Hostname,Status,Open Ports,First Seen,Last Seen,Notes"
        );

        let first = lines.next().unwrap();
        assert!(first.starts_with("10.0.0.7,web.lan,Online,80;443,"));

        let second = lines.next().unwrap();
        assert!(second.starts_with("10.0.0.8,Unknown,Offline,,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let devices = fixture();
        let json = to_json(&devices).unwrap();
        let back: Vec<Device> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, devices);
    }

    #[test]
    fn test_empty_inventory_exports() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);

        let json = to_json(&[]).unwrap();
        assert_eq!(json, "[]");
    }
}
