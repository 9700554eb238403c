//! Kernel module install/remove primitive trait.

use crate::error::UsbError;

/// Interface to the kernel-level module install/remove primitive.
///
/// The primitive is synchronous and not required to be idempotent;
/// idempotency (exactly one underlying call per net state transition)
/// is the responsibility of the coordinator's driver binding, not of
/// implementations of this trait.
pub trait KernelModule: Send {
    /// Install the named kernel module.
    ///
    /// # Errors
    /// Returns `UsbError::DriverInstall` if the primitive fails. On
    /// failure no partial installation is assumed.
    fn install(&self, name: &str) -> Result<(), UsbError>;

    /// Remove the named kernel module.
    ///
    /// # Errors
    /// Returns `UsbError::DriverRemove` if the primitive fails.
    fn remove(&self, name: &str) -> Result<(), UsbError>;
}
