//! Backing-File Adapter: a thin wrapper over POSIX open/pread/pwrite/fstat/close.
//!
//! Used only in persistent mode, to supply the initial `eof` on open and
//! to fault in pages absent from the buffer store. The engine treats
//! every call here as synchronous and blocking.

use std::fs::{File, OpenOptions};
use std::io::Result;
use std::os::unix::fs::FileExt;
use std::path::Path;

/// Host-requested open semantics, translated into POSIX flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostOpenFlags {
    /// Open read/write rather than read-only.
    pub read_write: bool,
    /// Truncate an existing file to zero length on open.
    pub truncate: bool,
    /// Create the file if it does not exist.
    pub create: bool,
    /// Fail if the file already exists (only meaningful with `create`).
    pub exclusive: bool,
}

/// Thin wrapper over the backing file's POSIX I/O surface.
pub struct BackingFile {
    file: File,
}

impl BackingFile {
    /// Opens (or creates) the backing file per the translated host flags.
    pub fn open<P: AsRef<Path>>(path: P, flags: HostOpenFlags) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(flags.read_write)
            .truncate(flags.truncate)
            .create(flags.create)
            .create_new(flags.create && flags.exclusive)
            .open(path)?;
        Ok(Self { file })
    }

    /// Current length of the backing file (the initial `eof` in persistent mode).
    pub fn size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Reads into `buf` starting at `offset`, returning the number of bytes
    /// actually read. A short read is expected near EOF; the caller decides
    /// whether the returned count matches what it asked for.
    pub fn pread(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        self.file.read_at(buf, offset)
    }

    /// Writes all of `buf` at `offset`.
    pub fn pwrite(&self, buf: &[u8], offset: u64) -> Result<()> {
        self.file.write_at(buf, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn fresh_file_has_zero_size() {
        let tmp = NamedTempFile::new().unwrap();
        let backing = BackingFile::open(
            tmp.path(),
            HostOpenFlags {
                read_write: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(backing.size().unwrap(), 0);
    }

    #[test]
    fn pwrite_then_pread_round_trips() {
        let tmp = NamedTempFile::new().unwrap();
        let backing = BackingFile::open(
            tmp.path(),
            HostOpenFlags {
                read_write: true,
                ..Default::default()
            },
        )
        .unwrap();
        backing.pwrite(b"hello", 10).unwrap();
        assert_eq!(backing.size().unwrap(), 15);

        let mut buf = [0u8; 5];
        let n = backing.pread(&mut buf, 10).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn pread_near_eof_is_short_not_an_error() {
        let tmp = NamedTempFile::new().unwrap();
        let backing = BackingFile::open(
            tmp.path(),
            HostOpenFlags {
                read_write: true,
                ..Default::default()
            },
        )
        .unwrap();
        backing.pwrite(b"abc", 0).unwrap();

        let mut buf = [0u8; 10];
        let n = backing.pread(&mut buf, 0).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..3], b"abc");
    }

    #[test]
    fn missing_file_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.dat");
        let err = BackingFile::open(&path, HostOpenFlags::default()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
