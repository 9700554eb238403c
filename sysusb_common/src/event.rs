//! Hotplug event and signal types.
//!
//! A [`RawHotplugEvent`] is the opaque record delivered by the event
//! channel; only `action` and `dev_path` are consumed by the
//! coordinator. A [`HotplugSignal`] is the typed lifecycle signal the
//! coordinator re-emits to external observers after classification.

use serde::{Deserialize, Serialize};

/// A raw hotplug notification from the event channel.
///
/// Transient: constructed once per notification, consumed by the
/// classifier and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHotplugEvent {
    /// Action string as delivered by the transport (e.g. "mount").
    pub action: String,
    /// Device path the action applies to.
    pub dev_path: String,
}

impl RawHotplugEvent {
    /// Build an event from an action and a device path.
    pub fn new(action: impl Into<String>, dev_path: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            dev_path: dev_path.into(),
        }
    }
}

/// A typed lifecycle signal emitted to external observers.
///
/// Fired once per qualifying raw event, in addition to the internal
/// per-manager dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotplugSignal {
    /// A device was mounted at the given device path.
    Mount(String),
    /// A device was unmounted from the given device path.
    Unmount(String),
}

impl HotplugSignal {
    /// Device path carried by the signal.
    pub fn dev_path(&self) -> &str {
        match self {
            HotplugSignal::Mount(path) | HotplugSignal::Unmount(path) => path,
        }
    }
}
