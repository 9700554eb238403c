//! Device manager registry and fan-out dispatch.
//!
//! Holds the ordered set of registered device managers. Attach and
//! detach are fail-fast and sequential; mount/unmount notification is
//! a best-effort broadcast that never halts on a manager failure.

use sysusb_common::{DeviceManager, UsbError};
use tracing::{debug, warn};

/// Ordered registry of device managers.
///
/// Registration order determines attach/detach sequencing and event
/// dispatch order. Populated once per install call via [`replace`],
/// mutated only by the coordinator's sequential methods.
///
/// [`replace`]: DeviceManagerRegistry::replace
pub struct DeviceManagerRegistry {
    managers: Vec<Box<dyn DeviceManager>>,
}

impl DeviceManagerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            managers: Vec::new(),
        }
    }

    /// Number of registered managers.
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Whether the registry holds no managers.
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Validate a prospective manager set without mutating anything.
    ///
    /// Names must be non-empty and unique within the supplied set.
    /// Called by the coordinator before any side effect of the
    /// install sequence, so a rejected set leaves a running
    /// coordinator untouched.
    ///
    /// # Errors
    /// Returns `UsbError::Validation` on an empty or duplicate name.
    pub fn validate(managers: &[Box<dyn DeviceManager>]) -> Result<(), UsbError> {
        let mut seen = std::collections::HashSet::new();
        for manager in managers {
            let name = manager.name();
            if name.is_empty() {
                return Err(UsbError::Validation(
                    "device manager name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name.to_string()) {
                return Err(UsbError::Validation(format!(
                    "duplicate device manager name: {name}"
                )));
            }
        }
        Ok(())
    }

    /// Replace the registered manager set, preserving argument order.
    ///
    /// Validates via [`validate`]; the previous set is dropped only
    /// on success.
    ///
    /// # Errors
    /// Returns `UsbError::Validation` on an empty or duplicate name.
    ///
    /// [`validate`]: DeviceManagerRegistry::validate
    pub fn replace(&mut self, managers: Vec<Box<dyn DeviceManager>>) -> Result<(), UsbError> {
        Self::validate(&managers)?;
        self.managers = managers;
        Ok(())
    }

    /// Attach every manager in registration order.
    ///
    /// Sequential and fail-fast: stops at the first failure, leaving
    /// managers after the failing one untouched. A partial attach is
    /// a legitimate terminal state reported upward.
    ///
    /// # Errors
    /// Returns `UsbError::Attach` naming the failing manager.
    pub fn attach_all(&mut self) -> Result<(), UsbError> {
        for manager in &mut self.managers {
            let name = manager.name().to_string();
            debug!("Attaching device manager '{name}'");
            manager.attach().map_err(|e| UsbError::Attach {
                manager: name,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Detach every manager in registration order.
    ///
    /// Same fail-fast sequential semantics as [`attach_all`].
    ///
    /// # Errors
    /// Returns `UsbError::Detach` naming the failing manager.
    ///
    /// [`attach_all`]: DeviceManagerRegistry::attach_all
    pub fn detach_all(&mut self) -> Result<(), UsbError> {
        for manager in &mut self.managers {
            let name = manager.name().to_string();
            debug!("Detaching device manager '{name}'");
            manager.detach().map_err(|e| UsbError::Detach {
                manager: name,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Broadcast a mount notification to every manager in order.
    ///
    /// Best-effort: a manager failure is logged and dispatch
    /// continues with the remaining managers.
    pub fn dispatch_mount(&mut self, dev_path: &str) {
        for manager in &mut self.managers {
            if let Err(e) = manager.mount_device(dev_path) {
                warn!(
                    "Manager '{}' failed to handle mount of {}: {}",
                    manager.name(),
                    dev_path,
                    e
                );
            }
        }
    }

    /// Broadcast an unmount notification to every manager in order.
    ///
    /// Same best-effort semantics as [`dispatch_mount`].
    ///
    /// [`dispatch_mount`]: DeviceManagerRegistry::dispatch_mount
    pub fn dispatch_unmount(&mut self, dev_path: &str) {
        for manager in &mut self.managers {
            if let Err(e) = manager.unmount_device(dev_path) {
                warn!(
                    "Manager '{}' failed to handle unmount of {}: {}",
                    manager.name(),
                    dev_path,
                    e
                );
            }
        }
    }
}

impl Default for DeviceManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
