//! # sys-usb Core Library
//!
//! Hotplug lifecycle coordinator for a USB subsystem. Installs and
//! removes a kernel-level bus driver, registers an arbitrary number
//! of device managers, and routes raw mount/unmount hardware events
//! to every registered manager in a strictly ordered, at-most-once
//! installed way.
//!
//! # Module Structure
//!
//! - [`binding`] - Idempotent kernel driver binding
//! - [`classifier`] - Raw event classification
//! - [`coordinator`] - HotplugCoordinator, install/detach sequencing
//! - [`modprobe`] - Default kernel module primitive (modprobe)
//! - [`registry`] - Device manager registry and fan-out dispatch
//! - [`uevent`] - Default netlink uevent channel
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    sysusb_core (single crate)                    │
//! │  ┌──────────────┐    ┌────────────────────┐    ┌──────────────┐  │
//! │  │ HotplugChannel◄──►│ HotplugCoordinator │◄──►│   Registry   │  │
//! │  │ (trait object)│    │  (install/detach)  │    │ (fan-out)    │  │
//! │  └──────────────┘    └─────────┬──────────┘    └──────┬───────┘  │
//! │                                │                      │          │
//! │                                ▼                      ▼          │
//! │                    ┌────────────────────┐    ┌──────────────┐    │
//! │                    │ KernelDriverBinding│    │ DeviceManager│    │
//! │                    │ (idempotent guard) │    │ trait objects│    │
//! │                    └────────────────────┘    └──────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod binding;
pub mod classifier;
pub mod coordinator;
pub mod modprobe;
pub mod registry;
pub mod uevent;

pub use crate::binding::KernelDriverBinding;
pub use crate::classifier::{classify, Classification};
pub use crate::coordinator::HotplugCoordinator;
pub use crate::modprobe::ModprobeKernel;
pub use crate::registry::DeviceManagerRegistry;
pub use crate::uevent::UeventChannel;
