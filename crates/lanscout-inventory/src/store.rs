//! SQLite device store

use chrono::{DateTime, Utc};
use lanscout_core::{Device, DeviceStatus, Error, OpenPort, Result};
use lanscout_net::services::service_name;
use rusqlite::{params, Connection, OptionalExtension};
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Device inventory backed by SQLite
pub struct DeviceStore {
    conn: Arc<Mutex<Connection>>,
}

impl DeviceStore {
    /// Open or create the inventory database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| Error::Database(format!("Failed to open inventory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("Failed to create in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                address TEXT PRIMARY KEY,
                hostname TEXT,
                status TEXT NOT NULL,
                first_seen TEXT,
                last_seen TEXT,
                notes TEXT
            );

            CREATE TABLE IF NOT EXISTS open_ports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL,
                port INTEGER NOT NULL,
                service TEXT,
                protocol TEXT NOT NULL DEFAULT 'tcp',
                discovered_at TEXT,
                FOREIGN KEY (address) REFERENCES devices(address)
            );

            CREATE INDEX IF NOT EXISTS idx_open_ports_address ON open_ports(address);
            "#,
        )
        .map_err(|e| Error::Database(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    /// Insert the device or refresh its status and last-seen stamp.
    /// The first-seen stamp is set once and survives rescans.
    pub fn upsert_device(&self, address: Ipv4Addr, status: DeviceStatus) -> Result<Device> {
        let now = Utc::now().to_rfc3339();
        {
            let conn = self.conn.lock().unwrap();
            let updated = conn
                .execute(
                    "UPDATE devices SET status = ?2, last_seen = ?3 WHERE address = ?1",
                    params![address.to_string(), status.as_str(), now],
                )
                .map_err(|e| Error::Database(format!("Failed to update device: {}", e)))?;

            if updated == 0 {
                conn.execute(
                    "INSERT INTO devices (address, status, first_seen, last_seen)
                     VALUES (?1, ?2, ?3, ?3)",
                    params![address.to_string(), status.as_str(), now],
                )
                .map_err(|e| Error::Database(format!("Failed to insert device: {}", e)))?;
                debug!("Inventoried new device {}", address);
            }
        }

        // The row exists now; read it back in full.
        self.device(address)?.ok_or_else(|| Error::DeviceNotFound {
            address: address.to_string(),
        })
    }

    /// Record port-scan results: set the hostname when one resolved and
    /// replace the device's open-port set, stamping each port with its
    /// catalog label.
    pub fn record_scan(
        &self,
        address: Ipv4Addr,
        hostname: Option<&str>,
        open_ports: &[u16],
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let addr = address.to_string();

        let exists: Option<String> = conn
            .query_row(
                "SELECT address FROM devices WHERE address = ?1",
                params![addr],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(format!("Failed to look up device: {}", e)))?;

        if exists.is_none() {
            return Err(Error::DeviceNotFound { address: addr });
        }

        if let Some(name) = hostname {
            conn.execute(
                "UPDATE devices SET hostname = ?2 WHERE address = ?1",
                params![addr, name],
            )
            .map_err(|e| Error::Database(format!("Failed to set hostname: {}", e)))?;
        }

        conn.execute("DELETE FROM open_ports WHERE address = ?1", params![addr])
            .map_err(|e| Error::Database(format!("Failed to clear old ports: {}", e)))?;

        let now = Utc::now().to_rfc3339();
        for &port in open_ports {
            conn.execute(
                "INSERT INTO open_ports (address, port, service, protocol, discovered_at)
                 VALUES (?1, ?2, ?3, 'tcp', ?4)",
                params![addr, port, service_name(port), now],
            )
            .map_err(|e| Error::Database(format!("Failed to record port: {}", e)))?;
        }

        debug!("Recorded {} open ports for {}", open_ports.len(), address);
        Ok(())
    }

    /// Look up one device by address
    pub fn device(&self, address: Ipv4Addr) -> Result<Option<Device>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT address, hostname, status, first_seen, last_seen, notes
                 FROM devices WHERE address = ?1",
                params![address.to_string()],
                device_from_row,
            )
            .optional()
            .map_err(|e| Error::Database(format!("Failed to load device: {}", e)))?;

        match row {
            Some(mut device) => {
                device.open_ports = load_ports(&conn, device.address)?;
                Ok(Some(device))
            }
            None => Ok(None),
        }
    }

    /// All inventoried devices in ascending address order
    pub fn all_devices(&self) -> Result<Vec<Device>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT address, hostname, status, first_seen, last_seen, notes FROM devices",
            )
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], device_from_row)
            .map_err(|e| Error::Database(format!("Failed to list devices: {}", e)))?;

        let mut devices = Vec::new();
        for row in rows {
            let mut device =
                row.map_err(|e| Error::Database(format!("Failed to read device row: {}", e)))?;
            device.open_ports = load_ports(&conn, device.address)?;
            devices.push(device);
        }

        // Stored addresses are TEXT; sort numerically, not lexically.
        devices.sort_by_key(|d| d.address);
        Ok(devices)
    }

    /// Attach free-form notes to a device
    pub fn set_notes(&self, address: Ipv4Addr, notes: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE devices SET notes = ?2 WHERE address = ?1",
                params![address.to_string(), notes],
            )
            .map_err(|e| Error::Database(format!("Failed to set notes: {}", e)))?;

        if updated == 0 {
            return Err(Error::DeviceNotFound {
                address: address.to_string(),
            });
        }
        Ok(())
    }

    /// Remove a device and its port records; true when something was deleted
    pub fn delete(&self, address: Ipv4Addr) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let addr = address.to_string();

        conn.execute("DELETE FROM open_ports WHERE address = ?1", params![addr])
            .map_err(|e| Error::Database(format!("Failed to delete ports: {}", e)))?;
        let deleted = conn
            .execute("DELETE FROM devices WHERE address = ?1", params![addr])
            .map_err(|e| Error::Database(format!("Failed to delete device: {}", e)))?;

        Ok(deleted > 0)
    }

    /// Aggregate counts for the summary view
    pub fn stats(&self) -> Result<InventoryStats> {
        let conn = self.conn.lock().unwrap();

        let count = |sql: &str| -> Result<usize> {
            conn.query_row(sql, [], |row| row.get::<_, i64>(0))
                .map(|n| n as usize)
                .map_err(|e| Error::Database(format!("Failed to aggregate: {}", e)))
        };

        let total_devices = count("SELECT COUNT(*) FROM devices")?;
        let online = count("SELECT COUNT(*) FROM devices WHERE status = 'Online'")?;
        let offline = count("SELECT COUNT(*) FROM devices WHERE status = 'Offline'")?;
        let total_open_ports = count("SELECT COUNT(*) FROM open_ports")?;
        let devices_with_ports =
            count("SELECT COUNT(DISTINCT address) FROM open_ports")?;

        let mut stmt = conn
            .prepare(
                "SELECT port, service, COUNT(*) AS n FROM open_ports
                 GROUP BY port, service ORDER BY n DESC, port ASC LIMIT 5",
            )
            .map_err(|e| Error::Database(format!("Failed to prepare stats query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, u16>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? as usize,
                ))
            })
            .map_err(|e| Error::Database(format!("Failed to query top ports: {}", e)))?;

        let mut top_ports = Vec::new();
        for row in rows {
            top_ports
                .push(row.map_err(|e| Error::Database(format!("Failed to read stats: {}", e)))?);
        }

        Ok(InventoryStats {
            total_devices,
            online,
            offline,
            total_open_ports,
            devices_with_ports,
            top_ports,
        })
    }
}

/// Aggregate inventory counts for the summary view
#[derive(Debug, Default)]
pub struct InventoryStats {
    pub total_devices: usize,
    pub online: usize,
    pub offline: usize,
    pub total_open_ports: usize,
    pub devices_with_ports: usize,
    /// Most common (port, service, device count), largest first
    pub top_ports: Vec<(u16, String, usize)>,
}

fn device_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Device> {
    let address: String = row.get(0)?;
    let address = address.parse::<Ipv4Addr>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let status: String = row.get(2)?;

    Ok(Device {
        address,
        hostname: row.get(1)?,
        status: DeviceStatus::from_label(&status),
        open_ports: Vec::new(),
        first_seen: parse_stamp(row.get(3)?),
        last_seen: parse_stamp(row.get(4)?),
        notes: row.get(5)?,
    })
}

fn load_ports(conn: &Connection, address: Ipv4Addr) -> Result<Vec<OpenPort>> {
    let mut stmt = conn
        .prepare(
            "SELECT port, service, protocol, discovered_at FROM open_ports
             WHERE address = ?1 ORDER BY port ASC",
        )
        .map_err(|e| Error::Database(format!("Failed to prepare port query: {}", e)))?;

    let rows = stmt
        .query_map(params![address.to_string()], |row| {
            Ok(OpenPort {
                port: row.get(0)?,
                service: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                protocol: row.get(2)?,
                discovered_at: parse_stamp(row.get(3)?).unwrap_or_else(Utc::now),
            })
        })
        .map_err(|e| Error::Database(format!("Failed to load ports: {}", e)))?;

    let mut ports = Vec::new();
    for row in rows {
        ports.push(row.map_err(|e| Error::Database(format!("Failed to read port row: {}", e)))?);
    }
    Ok(ports)
}

fn parse_stamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
