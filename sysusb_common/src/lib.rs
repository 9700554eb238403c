//! sys-usb Common Library
//!
//! Shared types and trait seams for the sys-usb workspace: the
//! collaborator interfaces consumed by the hotplug coordinator, the
//! hotplug event/signal types, the workspace error type and the
//! TOML configuration loader.
//!
//! # Module Structure
//!
//! - [`channel`] - Hotplug event channel trait
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Workspace error type
//! - [`event`] - Raw hotplug events and typed lifecycle signals
//! - [`kernel`] - Kernel module install/remove primitive trait
//! - [`manager`] - Device manager capability trait

#![deny(warnings)]
#![deny(missing_docs)]

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod kernel;
pub mod manager;

pub use crate::channel::HotplugChannel;
pub use crate::config::UsbConfig;
pub use crate::error::UsbError;
pub use crate::event::{HotplugSignal, RawHotplugEvent};
pub use crate::kernel::KernelModule;
pub use crate::manager::DeviceManager;
