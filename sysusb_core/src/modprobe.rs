//! Default kernel module primitive backed by modprobe.

use std::process::Command;
use sysusb_common::{KernelModule, UsbError};
use tracing::debug;

/// `KernelModule` implementation that shells out to `modprobe`.
///
/// Install runs `modprobe <name>`, remove runs `modprobe -r <name>`.
/// Not idempotent by itself; the coordinator's driver binding guards
/// against redundant calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModprobeKernel;

impl ModprobeKernel {
    /// Create the modprobe-backed primitive.
    pub fn new() -> Self {
        Self
    }
}

fn run_modprobe(args: &[&str]) -> Result<(), String> {
    debug!("Running modprobe {}", args.join(" "));
    let status = Command::new("modprobe")
        .args(args)
        .status()
        .map_err(|e| format!("failed to spawn modprobe: {e}"))?;
    if !status.success() {
        return Err(format!("modprobe {} exited with {status}", args.join(" ")));
    }
    Ok(())
}

impl KernelModule for ModprobeKernel {
    fn install(&self, name: &str) -> Result<(), UsbError> {
        run_modprobe(&[name]).map_err(UsbError::DriverInstall)
    }

    fn remove(&self, name: &str) -> Result<(), UsbError> {
        run_modprobe(&["-r", name]).map_err(UsbError::DriverRemove)
    }
}
