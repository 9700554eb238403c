//! Default hotplug channel backed by the kernel uevent netlink socket.
//!
//! Listens on `NETLINK_KOBJECT_UEVENT` and pushes parsed events into
//! the subscriber's channel from a reader thread. The kernel speaks
//! `add`/`remove`; this transport translates those into the channel
//! vocabulary `mount`/`unmount` consumed by the classifier. All other
//! action values pass through unchanged (and end up ignored).

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use sysusb_common::{HotplugChannel, RawHotplugEvent, UsbError};
use tracing::{debug, warn};

/// Receive buffer size for one uevent datagram.
const UEVENT_BUFFER_SIZE: usize = 8192;

/// Receive timeout so the reader thread can observe the running flag.
const RECV_TIMEOUT_MS: libc::time_t = 200;

/// Hotplug channel reading kernel uevents from a netlink socket.
pub struct UeventChannel {
    fd: Option<i32>,
    running: Arc<AtomicBool>,
    subscriber: Option<mpsc::Sender<RawHotplugEvent>>,
    reader: Option<thread::JoinHandle<()>>,
}

impl UeventChannel {
    /// Create an unstarted channel. No socket is opened yet.
    pub fn new() -> Self {
        Self {
            fd: None,
            running: Arc::new(AtomicBool::new(false)),
            subscriber: None,
            reader: None,
        }
    }

    /// Open and bind the netlink uevent socket.
    fn open_socket() -> Result<i32, UsbError> {
        // SAFETY: plain socket(2)/bind(2)/setsockopt(2) calls on a
        // zeroed sockaddr_nl; the fd is owned by this channel and
        // closed in stop()/drop().
        unsafe {
            let fd = libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_DGRAM | libc::SOCK_CLOEXEC,
                libc::NETLINK_KOBJECT_UEVENT,
            );
            if fd < 0 {
                return Err(UsbError::ChannelStart(format!(
                    "netlink socket failed: {}",
                    io::Error::last_os_error()
                )));
            }

            let mut addr: libc::sockaddr_nl = std::mem::zeroed();
            addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;
            addr.nl_groups = 1; // kernel uevent multicast group
            let rc = libc::bind(
                fd,
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            );
            if rc < 0 {
                let err = io::Error::last_os_error();
                libc::close(fd);
                return Err(UsbError::ChannelStart(format!(
                    "netlink bind failed: {err}"
                )));
            }

            // Bounded recv so the reader can poll the running flag.
            let timeout = libc::timeval {
                tv_sec: 0,
                tv_usec: (RECV_TIMEOUT_MS * 1000) as libc::suseconds_t,
            };
            let rc = libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                &timeout as *const libc::timeval as *const libc::c_void,
                std::mem::size_of::<libc::timeval>() as libc::socklen_t,
            );
            if rc < 0 {
                let err = io::Error::last_os_error();
                libc::close(fd);
                return Err(UsbError::ChannelStart(format!(
                    "netlink SO_RCVTIMEO failed: {err}"
                )));
            }

            Ok(fd)
        }
    }

    /// Stop the reader thread and close the socket, if running.
    fn teardown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("Uevent reader thread panicked");
            }
        }
        if let Some(fd) = self.fd.take() {
            // SAFETY: fd was opened by open_socket() and is closed once.
            unsafe {
                libc::close(fd);
            }
        }
        self.subscriber = None;
    }
}

impl Default for UeventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl HotplugChannel for UeventChannel {
    fn subscribe(&mut self) -> mpsc::Receiver<RawHotplugEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscriber = Some(tx);
        rx
    }

    fn start(&mut self) -> Result<(), UsbError> {
        let tx = self
            .subscriber
            .clone()
            .ok_or_else(|| UsbError::ChannelStart("no subscriber registered".to_string()))?;

        // Restarting replaces any previous reader.
        if self.reader.is_some() {
            let subscriber = self.subscriber.take();
            self.teardown();
            self.subscriber = subscriber;
        }

        let fd = Self::open_socket()?;
        self.fd = Some(fd);
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        self.reader = Some(thread::spawn(move || {
            debug!("Uevent reader started");
            let mut buf = [0u8; UEVENT_BUFFER_SIZE];
            while running.load(Ordering::SeqCst) {
                // SAFETY: buf outlives the call; n is bounds-checked below.
                let n = unsafe {
                    libc::recv(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0)
                };
                if n < 0 {
                    let err = io::Error::last_os_error();
                    match err.kind() {
                        io::ErrorKind::WouldBlock
                        | io::ErrorKind::TimedOut
                        | io::ErrorKind::Interrupted => continue,
                        _ => {
                            if running.load(Ordering::SeqCst) {
                                warn!("Uevent recv failed: {err}");
                            }
                            break;
                        }
                    }
                }
                if n == 0 {
                    continue;
                }
                if let Some(event) = parse_uevent(&buf[..n as usize]) {
                    if tx.send(event).is_err() {
                        // Subscriber gone; nothing left to deliver to.
                        break;
                    }
                }
            }
            debug!("Uevent reader stopped");
        }));

        debug!("Uevent channel started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), UsbError> {
        self.teardown();
        debug!("Uevent channel stopped");
        Ok(())
    }
}

impl Drop for UeventChannel {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Parse one uevent datagram into a raw hotplug event.
///
/// The payload is a NUL-separated record: a `action@devpath` header
/// followed by `KEY=VALUE` pairs. `ACTION`/`DEVPATH` pairs are
/// preferred; the header is the fallback. Kernel `add`/`remove`
/// actions are translated to `mount`/`unmount`. Returns `None` for
/// datagrams that carry no usable action/path (including libudev
/// control messages).
pub fn parse_uevent(buf: &[u8]) -> Option<RawHotplugEvent> {
    // udevd re-broadcasts with a "libudev" magic header; kernel-origin
    // events are the plain-text ones we want.
    if buf.starts_with(b"libudev") {
        return None;
    }

    let mut action: Option<&str> = None;
    let mut dev_path: Option<&str> = None;

    let mut fields = buf.split(|b| *b == 0);
    let header = fields.next().and_then(|f| std::str::from_utf8(f).ok());

    for field in fields {
        let Ok(field) = std::str::from_utf8(field) else {
            continue;
        };
        if let Some(value) = field.strip_prefix("ACTION=") {
            action = Some(value);
        } else if let Some(value) = field.strip_prefix("DEVPATH=") {
            dev_path = Some(value);
        }
    }

    if action.is_none() || dev_path.is_none() {
        if let Some((header_action, header_path)) = header.and_then(|h| h.split_once('@')) {
            action.get_or_insert(header_action);
            dev_path.get_or_insert(header_path);
        }
    }

    Some(RawHotplugEvent::new(
        translate_action(action?),
        dev_path?,
    ))
}

/// Map kernel uevent actions onto the channel vocabulary.
fn translate_action(raw: &str) -> &str {
    match raw {
        "add" => "mount",
        "remove" => "unmount",
        other => other,
    }
}
