//! Raw hotplug event classification.
//!
//! Pure mapping from a raw event record to a mount/unmount/ignored
//! decision plus the extracted device path. No side effects.

use sysusb_common::RawHotplugEvent;

/// Classification of one raw hotplug event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The event mounts a device at the given path.
    Mount(String),
    /// The event unmounts a device from the given path.
    Unmount(String),
    /// The event carries an unrecognized action; no dispatch, no error.
    Ignored,
}

/// Classify a raw event by its action string.
///
/// `"mount"` and `"unmount"` map to the corresponding classification
/// with the event's device path; any other action value is ignored.
pub fn classify(event: &RawHotplugEvent) -> Classification {
    match event.action.as_str() {
        "mount" => Classification::Mount(event.dev_path.clone()),
        "unmount" => Classification::Unmount(event.dev_path.clone()),
        _ => Classification::Ignored,
    }
}
