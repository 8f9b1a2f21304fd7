//! Driver Registration Facade: process-wide driver identifier and the
//! "set this driver on a property list" entry point.
//!
//! A real host library hands out a driver id once, when a class record
//! referencing this engine's entry points is registered with its
//! virtual-file layer, and clears it again at `terminate`. This facade
//! models that lifecycle with a `OnceLock`-backed registry rather than
//! a dependency-provided singleton, per the design note on the global
//! mutable driver id and init latch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Opaque process-wide driver identifier, analogous to the host
/// library's `hid_t` returned for a registered file-driver class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverId(u64);

static NEXT_DRIVER_ID: AtomicU64 = AtomicU64::new(1);
static REGISTERED: OnceLock<DriverId> = OnceLock::new();

/// Registers the driver's class record with the host library, if not
/// already registered. Idempotent: a second call returns the same id.
pub fn register() -> EngineResult<DriverId> {
    buffer_store::ensure_service_initialized()?;
    let id = *REGISTERED.get_or_init(|| DriverId(NEXT_DRIVER_ID.fetch_add(1, Ordering::Relaxed)));
    log::debug!("registered driver id {}", id.0);
    Ok(id)
}

/// Returns the current driver id, if registration has already happened.
pub fn current() -> Option<DriverId> {
    REGISTERED.get().copied()
}

/// Finalizes the driver: shuts down the buffer-store service.
///
/// `OnceLock` offers no reset, so a fresh process is needed to
/// re-register after this call; that matches the host library's own
/// one-shot `H5FD_hermes_term` lifecycle within a process.
pub fn terminate() -> EngineResult<()> {
    buffer_store::finalize_service()?;
    log::debug!("terminated driver");
    Ok(())
}

/// A host library's property-list values, as far as this driver cares:
/// just the pair this driver's "set" entry point stores into the
/// caller's property list slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePropertyList {
    config: Option<EngineConfig>,
}

impl FilePropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `(persistence, page_size)` under this driver's slot,
    /// registering the driver first if it has not been already.
    pub fn set_hermes_vfd(&mut self, persistence: bool, page_size: usize) -> EngineResult<()> {
        register()?;
        self.config = Some(EngineConfig::new(persistence, page_size)?);
        Ok(())
    }

    /// Retrieves the configuration previously stored by [`Self::set_hermes_vfd`].
    pub fn config(&self) -> EngineResult<EngineConfig> {
        self.config.ok_or_else(|| {
            EngineError::InvalidArgument(
                "property list has no hermes-vfd configuration set".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let a = register().unwrap();
        let b = register().unwrap();
        assert_eq!(a, b);
        assert_eq!(current(), Some(a));
    }

    #[test]
    fn property_list_round_trips_config() {
        let mut plist = FilePropertyList::new();
        assert!(plist.config().is_err());
        plist.set_hermes_vfd(true, 4096).unwrap();
        let config = plist.config().unwrap();
        assert!(config.persistence);
        assert_eq!(config.page_size, 4096);
    }

    #[test]
    fn property_list_rejects_zero_page_size() {
        let mut plist = FilePropertyList::new();
        assert!(plist.set_hermes_vfd(false, 0).is_err());
    }
}
