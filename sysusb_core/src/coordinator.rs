//! Hotplug coordinator: install/detach sequencing and event routing.
//!
//! The `HotplugCoordinator` owns the kernel driver binding and the
//! device manager registry, runs the ordered install/detach
//! sequences, subscribes to the event channel and re-emits classified
//! events as typed mount/unmount signals.

use crate::binding::KernelDriverBinding;
use crate::classifier::{classify, Classification};
use crate::registry::DeviceManagerRegistry;
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use sysusb_common::{
    DeviceManager, HotplugChannel, HotplugSignal, KernelModule, RawHotplugEvent, UsbConfig,
    UsbError,
};
use tracing::{debug, info, warn};

/// Poll interval for the listener thread's shutdown check.
const LISTENER_POLL: Duration = Duration::from_millis(50);

/// Coordinator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinatorState {
    /// No install sequence has completed (or a detach has).
    Idle,
    /// Steady running state: channel started, driver installed.
    Installed,
}

/// Shared list of external signal subscribers.
type Subscribers = Arc<Mutex<Vec<mpsc::Sender<HotplugSignal>>>>;

/// Handle to the running listener thread.
struct Listener {
    active: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// Lifecycle/event coordinator for the USB subsystem.
///
/// All install-sequence and detach-sequence steps execute strictly
/// sequentially, short-circuiting at the first failure with no
/// compensating rollback of earlier successful steps.
///
/// Install and detach take `&mut self`, so overlapping calls on one
/// coordinator are unrepresentable without external synchronization;
/// callers that share a coordinator across threads must serialize
/// access themselves.
pub struct HotplugCoordinator {
    /// Idempotent guard over the kernel bus driver.
    binding: KernelDriverBinding,
    /// Raw hotplug notification source.
    channel: Box<dyn HotplugChannel>,
    /// Ordered device manager set, shared with the listener thread.
    registry: Arc<Mutex<DeviceManagerRegistry>>,
    /// External mount/unmount signal subscribers.
    subscribers: Subscribers,
    /// Running listener thread, if any.
    listener: Option<Listener>,
    /// Lifecycle state.
    state: CoordinatorState,
    /// Optional sysfs bus directory scanned for already-plugged devices.
    bus_path: Option<PathBuf>,
}

impl HotplugCoordinator {
    /// Create a coordinator from its configuration and collaborators.
    ///
    /// No side effect occurs until [`install`] is called.
    ///
    /// [`install`]: HotplugCoordinator::install
    pub fn new(
        config: &UsbConfig,
        kernel: Box<dyn KernelModule>,
        channel: Box<dyn HotplugChannel>,
    ) -> Self {
        Self {
            binding: KernelDriverBinding::new(config.driver_name.clone(), kernel),
            channel,
            registry: Arc::new(Mutex::new(DeviceManagerRegistry::new())),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            listener: None,
            state: CoordinatorState::Idle,
            bus_path: config.bus_path.clone(),
        }
    }

    /// Whether the coordinator is in the steady running state.
    pub fn is_installed(&self) -> bool {
        self.state == CoordinatorState::Installed
    }

    /// Subscribe to the coordinator's external mount/unmount signals.
    ///
    /// One signal is delivered per qualifying raw event, in addition
    /// to the internal per-manager dispatch. Dropped receivers are
    /// pruned on the next send.
    pub fn subscribe(&self) -> mpsc::Receiver<HotplugSignal> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Run the install sequence with the given device managers.
    ///
    /// Registers the managers (argument order becomes registration
    /// order), then executes strictly sequentially, short-circuiting
    /// on the first error:
    ///
    /// 1. attach every manager,
    /// 2. subscribe to the event channel and start it,
    /// 3. install the kernel bus driver (idempotent).
    ///
    /// Zero managers is valid: the coordinator degrades to listen-only
    /// behavior with no dispatch targets. Calling `install` again
    /// without an intervening [`detach`] replaces the manager set and
    /// re-runs the sequence; the kernel install is not repeated.
    ///
    /// # Errors
    /// The first failing step's error; earlier successful steps are
    /// not rolled back.
    ///
    /// [`detach`]: HotplugCoordinator::detach
    pub fn install(&mut self, managers: Vec<Box<dyn DeviceManager>>) -> Result<(), UsbError> {
        info!(
            "Installing hotplug coordinator with {} device manager(s)",
            managers.len()
        );

        // Validation happens before any side effect: a rejected set
        // leaves a running coordinator (listener included) untouched.
        DeviceManagerRegistry::validate(&managers)?;

        // Exactly one dispatch loop may be live.
        self.retire_listener();

        self.registry.lock().replace(managers)?;

        self.registry.lock().attach_all()?;

        // Subscription is active before start() is called, so no
        // event is missed once the channel is running.
        let events = self.channel.subscribe();
        self.listener = Some(spawn_listener(
            events,
            Arc::clone(&self.registry),
            Arc::clone(&self.subscribers),
        ));
        self.channel.start()?;

        self.binding.ensure_installed()?;

        self.state = CoordinatorState::Installed;
        info!("Hotplug coordinator installed");

        self.mount_existing_devices();
        Ok(())
    }

    /// Run the detach sequence.
    ///
    /// Strictly sequential, short-circuiting on the first error:
    ///
    /// 1. stop the event channel and retire the listener thread,
    /// 2. detach every manager,
    /// 3. remove the kernel bus driver (idempotent).
    ///
    /// Detaching a coordinator that was never installed is a no-op
    /// returning success.
    ///
    /// # Errors
    /// The first failing step's error; later steps are not attempted.
    pub fn detach(&mut self) -> Result<(), UsbError> {
        info!("Detaching hotplug coordinator");

        self.channel.stop()?;
        self.retire_listener();

        self.registry.lock().detach_all()?;

        self.binding.ensure_removed()?;

        self.state = CoordinatorState::Idle;
        info!("Hotplug coordinator detached");
        Ok(())
    }

    /// Stop the listener thread and wait for it to exit.
    fn retire_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.active.store(false, Ordering::SeqCst);
            if listener.handle.join().is_err() {
                warn!("Hotplug listener thread panicked");
            }
        }
    }

    /// Dispatch a mount for every device already present under the
    /// configured bus path.
    ///
    /// Entries are symlinks resolved relative to the bus directory.
    /// Best-effort: enumeration failures are logged and skipped.
    fn mount_existing_devices(&self) {
        let Some(dir) = &self.bus_path else {
            return;
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot scan bus path {:?}: {}", dir, e);
                return;
            }
        };
        for entry in entries.flatten() {
            let link = entry.path();
            let target = match fs::read_link(&link) {
                Ok(target) => target,
                Err(e) => {
                    debug!("Skipping non-link bus entry {:?}: {}", link, e);
                    continue;
                }
            };
            let dev_path = if target.is_absolute() {
                target
            } else {
                dir.join(target)
            };
            let dev_path = dev_path.to_string_lossy().into_owned();
            info!("Mounting already-plugged device at {dev_path}");
            self.registry.lock().dispatch_mount(&dev_path);
            broadcast(&self.subscribers, HotplugSignal::Mount(dev_path));
        }
    }
}

impl Drop for HotplugCoordinator {
    fn drop(&mut self) {
        self.retire_listener();
    }
}

/// Spawn the event dispatch loop.
///
/// The loop classifies each raw event, fans it out to the registry
/// and emits one external signal per qualifying event. Manager
/// failures are isolated inside the registry and never stop the loop.
fn spawn_listener(
    events: mpsc::Receiver<RawHotplugEvent>,
    registry: Arc<Mutex<DeviceManagerRegistry>>,
    subscribers: Subscribers,
) -> Listener {
    let active = Arc::new(AtomicBool::new(true));
    let active_flag = Arc::clone(&active);

    let handle = thread::spawn(move || {
        debug!("Hotplug listener started");
        loop {
            match events.recv_timeout(LISTENER_POLL) {
                Ok(event) => match classify(&event) {
                    Classification::Mount(path) => {
                        debug!("Mount event for {path}");
                        registry.lock().dispatch_mount(&path);
                        broadcast(&subscribers, HotplugSignal::Mount(path));
                    }
                    Classification::Unmount(path) => {
                        debug!("Unmount event for {path}");
                        registry.lock().dispatch_unmount(&path);
                        broadcast(&subscribers, HotplugSignal::Unmount(path));
                    }
                    Classification::Ignored => {
                        debug!("Ignoring event with action '{}'", event.action);
                    }
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if !active_flag.load(Ordering::SeqCst) {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("Hotplug listener stopped");
    });

    Listener { active, handle }
}

/// Send a signal to every live subscriber, pruning dropped ones.
fn broadcast(subscribers: &Subscribers, signal: HotplugSignal) {
    subscribers
        .lock()
        .retain(|tx| tx.send(signal.clone()).is_ok());
}
