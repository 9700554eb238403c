//! Configuration loading and validation.
//!
//! TOML-backed configuration for the sys-usb coordinator, loaded in a
//! parse-then-validate sequence.
//!
//! # TOML Example
//!
//! ```toml
//! driver_name = "ehci-platform"
//! bus_path = "/sys/bus/usb/devices"
//! ```

use crate::error::UsbError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default kernel bus driver managed by the coordinator.
pub const DEFAULT_DRIVER_NAME: &str = "ehci-platform";

/// Coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbConfig {
    /// Name of the kernel bus driver to install/remove.
    #[serde(default = "default_driver_name")]
    pub driver_name: String,

    /// Optional sysfs bus directory scanned at install time for
    /// devices that are already plugged. Entries are symlinks that
    /// resolve to device paths.
    #[serde(default)]
    pub bus_path: Option<PathBuf>,
}

fn default_driver_name() -> String {
    DEFAULT_DRIVER_NAME.to_string()
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            driver_name: default_driver_name(),
            bus_path: None,
        }
    }
}

impl UsbConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Returns `UsbError::Config` on parse or validation failure.
    pub fn from_toml(content: &str) -> Result<Self, UsbError> {
        let config: UsbConfig = toml::from_str(content)
            .map_err(|e| UsbError::Config(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `UsbError::Config` if the file cannot be read, parsed
    /// or validated.
    pub fn load(path: &Path) -> Result<Self, UsbError> {
        info!("Loading configuration from {:?}", path);
        let content = fs::read_to_string(path)
            .map_err(|e| UsbError::Config(format!("Failed to read config file {path:?}: {e}")))?;
        Self::from_toml(&content)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `UsbError::Config` if `driver_name` is empty.
    pub fn validate(&self) -> Result<(), UsbError> {
        if self.driver_name.is_empty() {
            return Err(UsbError::Config(
                "driver_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
