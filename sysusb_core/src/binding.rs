//! Idempotent kernel driver binding.
//!
//! Wraps the install/remove primitive for a single named kernel bus
//! driver and tracks installed state, so repeated install/detach
//! cycles issue exactly one underlying kernel call per net state
//! transition.

use sysusb_common::{KernelModule, UsbError};
use tracing::{debug, info};

/// Installed/not-installed guard over one named kernel driver.
///
/// Mutated only by the coordinator's sequential install/detach
/// methods; no internal locking is needed.
pub struct KernelDriverBinding {
    /// Kernel bus driver name (e.g. "ehci-platform").
    name: String,
    /// Whether the driver is currently installed by this binding.
    installed: bool,
    /// Underlying install/remove primitive.
    kernel: Box<dyn KernelModule>,
}

impl KernelDriverBinding {
    /// Create a binding for the named driver. No kernel call is made.
    pub fn new(name: impl Into<String>, kernel: Box<dyn KernelModule>) -> Self {
        Self {
            name: name.into(),
            installed: false,
            kernel,
        }
    }

    /// Driver name this binding manages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the driver is currently installed.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Install the driver if it is not already installed.
    ///
    /// A no-op when already installed. On primitive failure the state
    /// remains not-installed and the error is surfaced unchanged.
    ///
    /// # Errors
    /// Returns `UsbError::DriverInstall` from the primitive.
    pub fn ensure_installed(&mut self) -> Result<(), UsbError> {
        if self.installed {
            debug!("Driver '{}' already installed, skipping", self.name);
            return Ok(());
        }
        self.kernel.install(&self.name)?;
        self.installed = true;
        info!("Kernel driver '{}' installed", self.name);
        Ok(())
    }

    /// Remove the driver if it is installed.
    ///
    /// A no-op when not installed. State flips to not-installed only
    /// when the primitive succeeds.
    ///
    /// # Errors
    /// Returns `UsbError::DriverRemove` from the primitive.
    pub fn ensure_removed(&mut self) -> Result<(), UsbError> {
        if !self.installed {
            debug!("Driver '{}' not installed, skipping remove", self.name);
            return Ok(());
        }
        self.kernel.remove(&self.name)?;
        self.installed = false;
        info!("Kernel driver '{}' removed", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingKernel {
        installs: Arc<AtomicU32>,
        removes: Arc<AtomicU32>,
        fail_install: Arc<AtomicBool>,
        fail_remove: Arc<AtomicBool>,
    }

    impl KernelModule for CountingKernel {
        fn install(&self, name: &str) -> Result<(), UsbError> {
            if self.fail_install.load(Ordering::SeqCst) {
                return Err(UsbError::DriverInstall(format!("install {name} refused")));
            }
            self.installs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn remove(&self, name: &str) -> Result<(), UsbError> {
            if self.fail_remove.load(Ordering::SeqCst) {
                return Err(UsbError::DriverRemove(format!("remove {name} refused")));
            }
            self.removes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn binding_with_counters() -> (KernelDriverBinding, Arc<AtomicU32>, Arc<AtomicU32>) {
        let kernel = CountingKernel::default();
        let installs = Arc::clone(&kernel.installs);
        let removes = Arc::clone(&kernel.removes);
        (
            KernelDriverBinding::new("ehci-platform", Box::new(kernel)),
            installs,
            removes,
        )
    }

    #[test]
    fn test_install_is_idempotent() {
        let (mut binding, installs, _) = binding_with_counters();
        binding.ensure_installed().expect("first install");
        binding.ensure_installed().expect("second install");
        assert_eq!(installs.load(Ordering::SeqCst), 1);
        assert!(binding.is_installed());
    }

    #[test]
    fn test_remove_without_install_is_noop() {
        let (mut binding, _, removes) = binding_with_counters();
        binding.ensure_removed().expect("remove on fresh binding");
        assert_eq!(removes.load(Ordering::SeqCst), 0);
        assert!(!binding.is_installed());
    }

    #[test]
    fn test_full_cycle_one_call_each() {
        let (mut binding, installs, removes) = binding_with_counters();
        binding.ensure_installed().expect("install");
        binding.ensure_removed().expect("remove");
        binding.ensure_removed().expect("second remove");
        assert_eq!(installs.load(Ordering::SeqCst), 1);
        assert_eq!(removes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_install_leaves_state_unchanged() {
        let kernel = CountingKernel::default();
        let installs = Arc::clone(&kernel.installs);
        let fail = Arc::clone(&kernel.fail_install);
        let mut binding = KernelDriverBinding::new("ehci-platform", Box::new(kernel));

        fail.store(true, Ordering::SeqCst);
        let result = binding.ensure_installed();
        assert!(matches!(result, Err(UsbError::DriverInstall(_))));
        assert!(!binding.is_installed());

        // A later retry performs the real call.
        fail.store(false, Ordering::SeqCst);
        binding.ensure_installed().expect("retry succeeds");
        assert_eq!(installs.load(Ordering::SeqCst), 1);
        assert!(binding.is_installed());
    }

    #[test]
    fn test_failed_remove_keeps_installed() {
        let kernel = CountingKernel::default();
        let fail = Arc::clone(&kernel.fail_remove);
        let mut binding = KernelDriverBinding::new("ehci-platform", Box::new(kernel));

        binding.ensure_installed().expect("install");
        fail.store(true, Ordering::SeqCst);
        let result = binding.ensure_removed();
        assert!(matches!(result, Err(UsbError::DriverRemove(_))));
        assert!(binding.is_installed());
    }
}
