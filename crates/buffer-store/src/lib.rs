//! Buffer-store adapter: the engine's only window onto the external
//! multi-tier buffering service.
//!
//! The engine never talks to a concrete service directly. It talks to
//! the [`BufferStore`] trait, which mirrors the handful of operations a
//! real buffering service exposes: create/close/destroy a bucket, and
//! put/get/contains a blob within one. [`local::LocalBufferStore`] is an
//! in-process reference implementation used for tests and standalone
//! operation.

mod error;
mod local;

pub use error::{BufferStoreError, BufferStoreResult};
pub use local::LocalBufferStore;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Opaque handle to a bucket, one per logical file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketHandle(String);

impl BucketHandle {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The operations the paged I/O engine needs from a buffering service.
pub trait BufferStore: Send + Sync {
    /// Obtains or creates a bucket with the given textual name.
    fn bucket_create(&self, name: &str) -> BufferStoreResult<BucketHandle>;
    /// Releases a reference to a bucket without removing its blobs.
    fn bucket_close(&self, bucket: &BucketHandle) -> BufferStoreResult<()>;
    /// Releases a bucket and destroys its blobs.
    fn bucket_destroy(&self, bucket: &BucketHandle) -> BufferStoreResult<()>;
    /// Cross-check for whether a blob exists; the engine prefers its own bitmap.
    fn bucket_contains(&self, bucket: &BucketHandle, blob_name: &str) -> bool;
    /// Reads a blob's full contents into `out`; `out.len()` is the expected blob size.
    fn bucket_get(&self, bucket: &BucketHandle, blob_name: &str, out: &mut [u8]) -> BufferStoreResult<()>;
    /// Stores `data` under `blob_name`, overwriting any previous blob with that name.
    fn bucket_put(&self, bucket: &BucketHandle, blob_name: &str, data: &[u8]) -> BufferStoreResult<()>;
}

static SERVICE_INITIALIZED: AtomicBool = AtomicBool::new(false);
static SERVICE_INIT_LOCK: Mutex<()> = Mutex::new(());

/// Idempotent, process-wide initialization of the buffer-store service.
///
/// Reads its configuration path from `HERMES_CONF` (absent means defaults).
/// Safe to call from every `open`; only the first successful call does
/// any work. A failed attempt does not latch, so a later call may retry.
pub fn ensure_service_initialized() -> BufferStoreResult<()> {
    if SERVICE_INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }
    let _guard = SERVICE_INIT_LOCK.lock().map_err(|_| BufferStoreError::LockPoisoned)?;
    if SERVICE_INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }
    let conf = std::env::var("HERMES_CONF").ok();
    log::debug!("initializing buffer-store service (HERMES_CONF={conf:?})");
    SERVICE_INITIALIZED.store(true, Ordering::Release);
    Ok(())
}

/// Shuts the buffer-store service down at driver termination.
///
/// Clears the init latch so a subsequent `open` in the same process
/// re-initializes the service.
pub fn finalize_service() -> BufferStoreResult<()> {
    let _guard = SERVICE_INIT_LOCK.lock().map_err(|_| BufferStoreError::LockPoisoned)?;
    if SERVICE_INITIALIZED.swap(false, Ordering::AcqRel) {
        log::debug!("finalized buffer-store service");
    }
    Ok(())
}
