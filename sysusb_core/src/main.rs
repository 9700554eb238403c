//! # sys-usb Coordinator Binary
//!
//! Installs the USB bus driver, listens for kernel hotplug events and
//! logs every mount/unmount signal. Device managers are linked in by
//! embedding applications; this binary runs the coordinator in
//! listen-only mode.
//!
//! # Usage
//!
//! ```bash
//! # Listen with the default driver (ehci-platform)
//! sysusb
//!
//! # Specific driver and bus scan for already-plugged devices
//! sysusb --driver xhci-hcd --bus-path /sys/bus/usb/devices
//!
//! # TOML configuration and verbose logging
//! sysusb --config /etc/sysusb/config.toml -v
//! ```

#![deny(warnings)]

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;
use sysusb_common::{HotplugSignal, UsbConfig};
use sysusb_core::{HotplugCoordinator, ModprobeKernel, UeventChannel};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// sys-usb - hotplug lifecycle coordinator for the USB subsystem
#[derive(Parser, Debug)]
#[command(name = "sysusb")]
#[command(version)]
#[command(about = "Hotplug lifecycle coordinator for the USB subsystem")]
#[command(long_about = None)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Kernel bus driver name (overrides configuration)
    #[arg(short, long, value_name = "NAME")]
    driver: Option<String>,

    /// Sysfs bus directory scanned for already-plugged devices
    #[arg(long, value_name = "DIR")]
    bus_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("sys-usb failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_tracing(&args);

    info!("sys-usb v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = match args.config {
        Some(ref path) => UsbConfig::load(path)?,
        None => UsbConfig::default(),
    };
    if let Some(driver) = args.driver {
        config.driver_name = driver;
    }
    if let Some(bus_path) = args.bus_path {
        config.bus_path = Some(bus_path);
    }
    config.validate()?;
    info!(
        "Using kernel driver '{}', bus path {:?}",
        config.driver_name, config.bus_path
    );

    let mut coordinator = HotplugCoordinator::new(
        &config,
        Box::new(ModprobeKernel::new()),
        Box::new(UeventChannel::new()),
    );
    let signals = coordinator.subscribe();

    // Listen-only mode: no device managers registered.
    coordinator.install(Vec::new())?;

    let running = Arc::new(AtomicBool::new(true));
    let running_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running_flag.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match signals.recv_timeout(Duration::from_millis(200)) {
            Ok(HotplugSignal::Mount(path)) => info!("Device mounted: {path}"),
            Ok(HotplugSignal::Unmount(path)) => info!("Device unmounted: {path}"),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    coordinator.detach()?;
    info!("sys-usb shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
