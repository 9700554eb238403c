//! Hotplug event channel trait.

use crate::error::UsbError;
use crate::event::RawHotplugEvent;
use std::sync::mpsc;

/// Asynchronous source of raw hotplug notifications.
///
/// # Contract
///
/// - `subscribe()` must be called before `start()`. Delivery into the
///   returned receiver is active from the moment `start()` returns,
///   so a subscriber that is in place beforehand misses no events.
/// - Calling `subscribe()` again replaces the previous subscription;
///   the old receiver eventually disconnects.
/// - `stop()` on a channel that was never started succeeds trivially.
///   After `stop()` returns no further events are delivered; events
///   in flight during shutdown may be dropped without error.
pub trait HotplugChannel: Send {
    /// Subscribe to the event stream.
    ///
    /// Returns the receiving end of the stream. Events sent before
    /// `start()` completes are not guaranteed to be delivered.
    fn subscribe(&mut self) -> mpsc::Receiver<RawHotplugEvent>;

    /// Start delivering events to the current subscriber.
    ///
    /// # Errors
    /// Returns `UsbError::ChannelStart` if the underlying transport
    /// cannot be brought up.
    fn start(&mut self) -> Result<(), UsbError>;

    /// Stop delivering events.
    ///
    /// # Errors
    /// Returns `UsbError::ChannelStop` if the transport fails to shut
    /// down cleanly. Never fails for a channel that was not started.
    fn stop(&mut self) -> Result<(), UsbError>;
}
