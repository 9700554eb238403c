//! Error type for sys-usb operations.

use thiserror::Error;

/// Error types for hotplug coordination operations.
#[derive(Debug, Clone, Error)]
pub enum UsbError {
    /// A supplied device manager failed shape validation.
    #[error("Invalid device manager: {0}")]
    Validation(String),

    /// The kernel install primitive failed.
    #[error("Kernel driver install failed: {0}")]
    DriverInstall(String),

    /// The kernel remove primitive failed.
    #[error("Kernel driver remove failed: {0}")]
    DriverRemove(String),

    /// A specific manager's attach failed.
    #[error("Attach failed for manager '{manager}': {reason}")]
    Attach {
        /// Name of the failing manager.
        manager: String,
        /// Underlying failure description.
        reason: String,
    },

    /// A specific manager's detach failed.
    #[error("Detach failed for manager '{manager}': {reason}")]
    Detach {
        /// Name of the failing manager.
        manager: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The event channel failed to start.
    #[error("Event channel start failed: {0}")]
    ChannelStart(String),

    /// The event channel failed to stop.
    #[error("Event channel stop failed: {0}")]
    ChannelStop(String),

    /// A manager's own mount/unmount handling failed.
    ///
    /// Isolated per manager during dispatch; never aborts the
    /// broadcast to sibling managers.
    #[error("Device handling error: {0}")]
    Device(String),

    /// Configuration load or validation failed.
    #[error("Configuration error: {0}")]
    Config(String),
}
