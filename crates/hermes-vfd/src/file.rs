//! File Object Lifecycle: open/close/compare and the per-file state the
//! paged I/O engine (`engine.rs`) mutates.

use std::cmp::Ordering;
use std::sync::Arc;

use buffer_store::{BucketHandle, BufferStore};

use crate::backing::{BackingFile, HostOpenFlags};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::presence::PresenceSet;

/// Largest representable logical address: `off_t` is treated as a signed
/// 64-bit file offset, so the top bit and the all-ones value are excluded.
pub const MAXADDR: u64 = (i64::MAX as u64) - 1;

/// The kind of the last successful I/O operation on a file object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastOp {
    #[default]
    Unknown,
    Read,
    Write,
}

/// Per-file state: EOA/EOF, the last-operation tracker, the backing file
/// handle (persistent mode only), the bucket handle, the presence
/// bitmap, and the scratch page buffer.
pub struct FileObject {
    pub(crate) name: String,
    pub(crate) page_size: u64,
    pub(crate) maxaddr: u64,
    pub(crate) eoa: u64,
    pub(crate) eof: u64,
    pub(crate) pos: Option<u64>,
    pub(crate) op: LastOp,
    pub(crate) persistence: bool,
    pub(crate) backing: Option<BackingFile>,
    pub(crate) store: Arc<dyn BufferStore>,
    pub(crate) bucket: BucketHandle,
    pub(crate) page_buf: Vec<u8>,
    pub(crate) present: PresenceSet,
}

impl FileObject {
    /// Opens a logical file: creates its bucket, and in persistent mode
    /// opens the backing file and seeds `eof` from its current size.
    pub fn open(
        name: &str,
        open_flags: HostOpenFlags,
        config: EngineConfig,
        maxaddr: u64,
        store: Arc<dyn BufferStore>,
    ) -> EngineResult<Self> {
        if name.is_empty() {
            return Err(EngineError::InvalidArgument(
                "file name must not be empty".to_string(),
            ));
        }
        if maxaddr == 0 || maxaddr > MAXADDR {
            return Err(EngineError::InvalidArgument(format!(
                "maxaddr {maxaddr} is zero or exceeds the representable range"
            )));
        }

        buffer_store::ensure_service_initialized()?;

        let bucket = match store.bucket_create(name) {
            Ok(bucket) => bucket,
            Err(err) => return Err(EngineError::Store(err)),
        };

        let open_backing = || -> EngineResult<Option<BackingFile>> {
            if !config.persistence {
                return Ok(None);
            }
            let backing = BackingFile::open(name, open_flags)?;
            Ok(Some(backing))
        };

        let backing = match open_backing() {
            Ok(backing) => backing,
            Err(err) => {
                // The bucket was just created and holds no useful state.
                let _ = store.bucket_destroy(&bucket);
                return Err(err);
            }
        };

        let eof = match &backing {
            Some(backing) => backing.size()?,
            None => 0,
        };

        log::debug!(
            "opened '{name}' (persistence={}, page_size={}, eof={eof})",
            config.persistence,
            config.page_size
        );

        Ok(Self {
            name: name.to_string(),
            page_size: config.page_size as u64,
            maxaddr,
            eoa: 0,
            eof,
            pos: None,
            op: LastOp::Unknown,
            persistence: config.persistence,
            backing,
            store,
            bucket,
            page_buf: vec![0u8; config.page_size],
            present: PresenceSet::new(),
        })
    }

    /// Closes the file, writing back every present page in persistent
    /// mode if the last operation was a write.
    pub fn close(mut self) -> EngineResult<()> {
        if self.persistence && self.op == LastOp::Write {
            self.write_back()?;
        }
        // Bucket reference counting always collapses to 1 in this engine
        // (no multi-process sharing of a file object, see invariant 4 of
        // the reference-counting design note): the last close always
        // destroys the bucket's blobs.
        self.store.bucket_destroy(&self.bucket)?;
        log::debug!("closed '{}'", self.name);
        Ok(())
    }

    fn write_back(&mut self) -> EngineResult<()> {
        let backing = self
            .backing
            .as_ref()
            .expect("write_back only called in persistent mode");
        let page_count = self.eof.div_ceil(self.page_size);
        let name = self.name.clone();
        for k in 0..page_count {
            if !self.present.contains(k) {
                continue;
            }
            let blob_name = crate::codec::blob_name(k);
            self.store.bucket_get(&self.bucket, &blob_name, &mut self.page_buf)?;

            let page_start = k * self.page_size;
            let is_last_page = k + 1 == page_count;
            let tail = self.eof - page_start;
            let write_len = if is_last_page {
                tail.min(self.page_size) as usize
            } else {
                self.page_size as usize
            };
            backing.pwrite(&self.page_buf[..write_len], page_start)?;
        }
        log::debug!("wrote back {page_count} page(s) for '{name}'");
        Ok(())
    }

    /// Lexicographic comparison of two files' stored names, mirroring a
    /// strcmp-like host `cmp` entry point.
    pub fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    /// `query` always reports no optional capabilities.
    pub fn query(&self) -> u64 {
        0
    }

    pub fn get_eoa(&self) -> u64 {
        self.eoa
    }

    pub fn set_eoa(&mut self, addr: u64) {
        self.eoa = addr;
    }

    pub fn get_eof(&self) -> u64 {
        self.eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buffer_store::LocalBufferStore;
    use std::sync::Arc;

    fn store() -> Arc<dyn BufferStore> {
        Arc::new(LocalBufferStore::new())
    }

    #[test]
    fn open_rejects_empty_name() {
        let err = FileObject::open(
            "",
            HostOpenFlags::default(),
            EngineConfig::default(),
            MAXADDR,
            store(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn open_rejects_zero_maxaddr() {
        let err = FileObject::open(
            "x.dat",
            HostOpenFlags::default(),
            EngineConfig::default(),
            0,
            store(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn non_persistent_open_starts_at_eof_zero() {
        let file = FileObject::open(
            "mem.dat",
            HostOpenFlags::default(),
            EngineConfig::new(false, 1024).unwrap(),
            MAXADDR,
            store(),
        )
        .unwrap();
        assert_eq!(file.get_eof(), 0);
        assert_eq!(file.get_eoa(), 0);
    }

    #[test]
    fn eoa_accessors_round_trip() {
        let mut file = FileObject::open(
            "mem2.dat",
            HostOpenFlags::default(),
            EngineConfig::new(false, 1024).unwrap(),
            MAXADDR,
            store(),
        )
        .unwrap();
        file.set_eoa(4096);
        assert_eq!(file.get_eoa(), 4096);
    }

    #[test]
    fn cmp_is_lexicographic_on_name() {
        let a = FileObject::open(
            "a.dat",
            HostOpenFlags::default(),
            EngineConfig::new(false, 1024).unwrap(),
            MAXADDR,
            store(),
        )
        .unwrap();
        let b = FileObject::open(
            "b.dat",
            HostOpenFlags::default(),
            EngineConfig::new(false, 1024).unwrap(),
            MAXADDR,
            store(),
        )
        .unwrap();
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(b.cmp(&a), Ordering::Greater);
    }

    #[test]
    fn persistent_open_seeds_eof_from_backing_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeded.dat");
        std::fs::write(&path, [0u8; 10]).unwrap();

        let file = FileObject::open(
            path.to_str().unwrap(),
            HostOpenFlags {
                read_write: true,
                ..Default::default()
            },
            EngineConfig::new(true, 1024).unwrap(),
            MAXADDR,
            store(),
        )
        .unwrap();
        assert_eq!(file.get_eof(), 10);
    }
}
