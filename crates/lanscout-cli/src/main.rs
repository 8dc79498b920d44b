//! LANScout - LAN discovery and service inventory
//!
//! Command-line front-end wiring the probing engine to the device
//! inventory and the exporters.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use lanscout_common::Config;
use lanscout_core::{Device, DeviceStatus, SweepRange};
use lanscout_inventory::DeviceStore;
use lanscout_net::port_scan::{PortScanConfig, PortScanner};
use lanscout_net::probe::{IcmpPinger, Pinger};
use lanscout_net::resolve::resolve_hostname;
use lanscout_net::services::service_name;
use lanscout_net::sweep::{SweepConfig, Sweeper};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info};

/// LANScout network scanner
#[derive(Parser, Debug)]
#[command(name = "lanscout")]
#[command(version)]
#[command(about = "LAN discovery and service inventory", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "lanscout.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (pretty, json, compact)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ping-sweep a host range and record responding devices
    Sweep {
        /// First three octets of the network (e.g. 192.168.1)
        prefix: String,

        /// First host octet
        #[arg(long, default_value_t = 1)]
        start: u8,

        /// Last host octet
        #[arg(long, default_value_t = 254)]
        end: u8,

        /// Port-scan and resolve each responding host
        #[arg(long)]
        with_ports: bool,
    },

    /// Probe a single host and record the result
    Scan {
        /// Target address
        address: Ipv4Addr,

        /// Port-scan and resolve the host if it responds
        #[arg(long)]
        with_ports: bool,
    },

    /// List all inventoried devices
    List,

    /// Show one device in detail
    Show {
        /// Device address
        address: Ipv4Addr,
    },

    /// Attach notes to a device
    Note {
        /// Device address
        address: Ipv4Addr,

        /// Note text
        notes: String,
    },

    /// Remove a device from the inventory
    Delete {
        /// Device address
        address: Ipv4Addr,
    },

    /// Export the inventory to a file
    Export {
        /// Output format
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file path
        path: String,
    },

    /// Print inventory summary statistics
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_config = lanscout_common::logging::LogConfig::new()
        .level(args.log_level.as_str())
        .format(lanscout_common::logging::LogFormat::from_label(&args.log_format));
    lanscout_common::logging::init_logging_with_config(log_config);

    // Load configuration
    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        debug!("Config file not found, using defaults");
        Config::default()
    };
    let config = config.merge_env();

    let store = DeviceStore::open(&config.storage.database_path)?;
    info!("Inventory database: {}", config.storage.database_path);

    match args.command {
        Command::Sweep {
            prefix,
            start,
            end,
            with_ports,
        } => cmd_sweep(&store, &config, &prefix, start, end, with_ports).await,
        Command::Scan {
            address,
            with_ports,
        } => cmd_scan(&store, &config, address, with_ports).await,
        Command::List => cmd_list(&store),
        Command::Show { address } => cmd_show(&store, address),
        Command::Note { address, notes } => {
            store.set_notes(address, &notes)?;
            println!("Notes updated for {}.", address);
            Ok(())
        }
        Command::Delete { address } => {
            if store.delete(address)? {
                println!("Deleted {} from the inventory.", address);
            } else {
                println!("No device {} in the inventory.", address);
            }
            Ok(())
        }
        Command::Export { format, path } => cmd_export(&store, format, &path),
        Command::Stats => cmd_stats(&store),
    }
}

async fn cmd_sweep(
    store: &DeviceStore,
    config: &Config,
    prefix: &str,
    start: u8,
    end: u8,
    with_ports: bool,
) -> Result<()> {
    let range = SweepRange::new(prefix, start, end)?;
    println!("Sweeping {}...", range);

    let sweep_config = SweepConfig {
        timeout: config.scan.probe_timeout(),
        max_in_flight: config.scan.max_concurrent_hosts,
    };
    let sweeper = Sweeper::with_config(IcmpPinger::new(), sweep_config)
        .on_host_found(|ip| println!("[+] Found active host: {}", ip));

    let live = sweeper.sweep(&range).await;
    println!(
        "\nSweep complete. {} of {} hosts responding.",
        live.len(),
        range.host_count()
    );

    for &ip in &live {
        store.upsert_device(ip, DeviceStatus::Online)?;
    }

    if with_ports {
        for &ip in &live {
            println!("\nScanning ports on {}...", ip);
            scan_and_record(store, config, ip).await?;
        }
    }

    Ok(())
}

async fn cmd_scan(
    store: &DeviceStore,
    config: &Config,
    address: Ipv4Addr,
    with_ports: bool,
) -> Result<()> {
    println!("Probing {}...", address);

    let pinger = IcmpPinger::new();
    let online = pinger
        .probe(IpAddr::V4(address), config.scan.probe_timeout())
        .await;

    if !online {
        println!("[!] Host {} is not responding.", address);
        store.upsert_device(address, DeviceStatus::Offline)?;
        return Ok(());
    }

    println!("[+] Host {} is online.", address);
    store.upsert_device(address, DeviceStatus::Online)?;

    if with_ports {
        scan_and_record(store, config, address).await?;
    }

    Ok(())
}

async fn scan_and_record(store: &DeviceStore, config: &Config, address: Ipv4Addr) -> Result<()> {
    let hostname = if config.scan.resolve_hostnames {
        resolve_hostname(IpAddr::V4(address)).await
    } else {
        None
    };
    if let Some(name) = &hostname {
        println!("Hostname: {}", name);
    }

    let scanner = PortScanner::with_config(PortScanConfig {
        timeout: config.scan.probe_timeout(),
        max_in_flight: config.scan.max_concurrent_ports,
    });
    let open_ports = scanner.scan_common(IpAddr::V4(address)).await;

    for &port in &open_ports {
        println!(
            "[+] Port {} is open on {} ({})",
            port,
            address,
            service_name(port)
        );
    }
    if open_ports.is_empty() {
        println!("No common-service ports open on {}.", address);
    }

    store.record_scan(address, hostname.as_deref(), &open_ports)?;
    Ok(())
}

fn cmd_list(store: &DeviceStore) -> Result<()> {
    let devices = store.all_devices()?;
    if devices.is_empty() {
        println!("No devices in the inventory. Run a sweep first.");
        return Ok(());
    }

    println!(
        "{:<16} {:<24} {:<8} {:<6} {}",
        "Address", "Hostname", "Status", "Ports", "Last Seen"
    );
    for device in &devices {
        println!(
            "{:<16} {:<24} {:<8} {:<6} {}",
            device.address,
            device.hostname.as_deref().unwrap_or("Unknown"),
            device.status,
            device.open_ports.len(),
            device
                .last_seen
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| String::from("Never")),
        );
    }
    println!("\n{} devices.", devices.len());
    Ok(())
}

fn cmd_show(store: &DeviceStore, address: Ipv4Addr) -> Result<()> {
    let device = match store.device(address)? {
        Some(device) => device,
        None => {
            println!("No device {} in the inventory.", address);
            return Ok(());
        }
    };

    print_device(&device);
    Ok(())
}

fn print_device(device: &Device) {
    println!("Address:    {}", device.address);
    println!(
        "Hostname:   {}",
        device.hostname.as_deref().unwrap_or("Unknown")
    );
    println!("Status:     {}", device.status);
    println!(
        "First seen: {}",
        device
            .first_seen
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| String::from("Unknown"))
    );
    println!(
        "Last seen:  {}",
        device
            .last_seen
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| String::from("Unknown"))
    );
    println!(
        "Notes:      {}",
        device.notes.as_deref().unwrap_or("None")
    );

    if device.open_ports.is_empty() {
        println!("\nNo open ports on record.");
        return;
    }

    println!("\n{:<8} {:<14} {:<10} {}", "Port", "Service", "Protocol", "Discovered");
    for port in &device.open_ports {
        println!(
            "{:<8} {:<14} {:<10} {}",
            port.port,
            port.service,
            port.protocol,
            port.discovered_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
}

fn cmd_export(store: &DeviceStore, format: ExportFormat, path: &str) -> Result<()> {
    let devices = store.all_devices()?;
    if devices.is_empty() {
        println!("No devices to export. Run a sweep first.");
        return Ok(());
    }

    match format {
        ExportFormat::Csv => lanscout_export::write_csv(&devices, path)?,
        ExportFormat::Json => lanscout_export::write_json(&devices, path)?,
    }

    println!("Exported {} devices to {}.", devices.len(), path);
    Ok(())
}

fn cmd_stats(store: &DeviceStore) -> Result<()> {
    let stats = store.stats()?;
    if stats.total_devices == 0 {
        println!("No devices in the inventory. Run a sweep first.");
        return Ok(());
    }

    println!("Total devices:      {}", stats.total_devices);
    println!("Online:             {}", stats.online);
    println!("Offline:            {}", stats.offline);
    println!("Open ports:         {}", stats.total_open_ports);
    println!("Devices with ports: {}", stats.devices_with_ports);

    if !stats.top_ports.is_empty() {
        println!("\nMost common ports:");
        for (port, service, count) in &stats.top_ports {
            println!("  {:<6} {:<14} {} devices", port, service, count);
        }
    }

    Ok(())
}
