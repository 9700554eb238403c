//! Device manager capability trait.
//!
//! This module defines:
//! - `DeviceManager` trait - Interface for pluggable device handlers

use crate::error::UsbError;

/// Trait defining the interface for device managers.
///
/// The hotplug coordinator manages an ordered set of collaborators
/// through this trait, enabling pluggable device-class handlers
/// (camera, storage, serial, etc.).
///
/// # Lifecycle
///
/// 1. `attach()` - Called once per install, in registration order
/// 2. `mount_device()` / `unmount_device()` - Called per classified
///    hotplug event while the coordinator is installed
/// 3. `detach()` - Called once per detach, in registration order
///
/// Recognition of a specific device path is the manager's own
/// concern; the coordinator dispatches every classified event to
/// every registered manager, path-agnostically. A manager that does
/// not handle the given path should simply return `Ok(())`.
pub trait DeviceManager: Send {
    /// Returns the manager's identifier (e.g. "camera", "storage").
    ///
    /// Must be non-empty; used in error reporting and logs.
    fn name(&self) -> &str;

    /// Prepare the manager for service.
    ///
    /// Called by the coordinator during the install sequence, before
    /// the event channel starts. A failure here aborts the install
    /// sequence (fail-fast); managers registered after this one are
    /// never attached.
    fn attach(&mut self) -> Result<(), UsbError>;

    /// Release the manager's resources.
    ///
    /// Called by the coordinator during the detach sequence, after
    /// the event channel has stopped. Fail-fast like `attach`.
    fn detach(&mut self) -> Result<(), UsbError>;

    /// Handle a device mounted at `dev_path`.
    ///
    /// Best-effort notification: an error is logged by the registry
    /// and never halts dispatch to sibling managers.
    fn mount_device(&mut self, dev_path: &str) -> Result<(), UsbError>;

    /// Handle a device unmounted from `dev_path`.
    ///
    /// Same best-effort semantics as `mount_device`.
    fn unmount_device(&mut self, dev_path: &str) -> Result<(), UsbError>;
}
