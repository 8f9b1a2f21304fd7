//! Paged I/O Engine: translates `(addr, size)` byte-range requests into
//! whole-page blob operations, handling partial first/last pages,
//! fault-in from the backing file, and promotion into the buffer store.

use crate::codec::blob_name;
use crate::error::{EngineError, EngineResult};
use crate::file::{FileObject, LastOp};

/// The byte range within page `k` that a request `[addr, last]` touches,
/// as an `(offset, length)` pair. Collapses the spec's three named cases
/// (first partial / last partial / whole page) into one intersection:
/// a page with `offset == 0 && length == page_size` is the whole-page case.
fn page_overlap(k: u64, page_size: u64, addr: u64, last: u64) -> (usize, usize) {
    let page_start = k * page_size;
    let page_end = page_start + page_size - 1;
    let from = addr.max(page_start) - page_start;
    let to = last.min(page_end) - page_start;
    (from as usize, (to - from + 1) as usize)
}

impl FileObject {
    /// Validates a request and returns its exclusive end address.
    fn validate_request(&self, addr: u64, size: u64) -> EngineResult<u64> {
        let end = addr
            .checked_add(size)
            .ok_or_else(|| EngineError::InvalidArgument(format!("addr {addr} + size {size} overflows")))?;
        if end > self.maxaddr + 1 {
            return Err(EngineError::InvalidArgument(format!(
                "request [{addr}, {end}) exceeds maxaddr {}",
                self.maxaddr
            )));
        }
        Ok(end)
    }

    fn reset_after_error(&mut self) {
        self.pos = None;
        self.op = LastOp::Unknown;
    }

    /// Reads `size` bytes starting at `addr`, zero-filling any portion
    /// at or beyond `eof`.
    pub fn read(&mut self, addr: u64, size: u64) -> EngineResult<Vec<u8>> {
        if self.page_buf.len() != self.page_size as usize {
            return Err(EngineError::Uninitialized);
        }
        if size == 0 {
            self.pos = Some(addr);
            self.op = LastOp::Read;
            return Ok(Vec::new());
        }

        match self.read_inner(addr, size) {
            Ok(buf) => {
                self.pos = Some(addr + size);
                self.op = LastOp::Read;
                Ok(buf)
            }
            Err(err) => {
                self.reset_after_error();
                Err(err)
            }
        }
    }

    fn read_inner(&mut self, addr: u64, size: u64) -> EngineResult<Vec<u8>> {
        self.validate_request(addr, size)?;
        let mut buf = vec![0u8; size as usize];

        if addr >= self.eof {
            // Sparse read past EOF: zero-fill without touching the buffer store.
            return Ok(buf);
        }

        let last = addr + size - 1;
        let start = addr / self.page_size;
        let end = last / self.page_size;
        let page_size = self.page_size;
        let store = self.store.clone();
        let bucket = self.bucket.clone();

        let mut transfer = 0usize;
        for k in start..=end {
            let (offset, length) = page_overlap(k, page_size, addr, last);
            let whole = offset == 0 && length == page_size as usize;

            if self.present.contains(k) {
                if whole {
                    store.bucket_get(&bucket, &blob_name(k), &mut buf[transfer..transfer + length])?;
                } else {
                    store.bucket_get(&bucket, &blob_name(k), &mut self.page_buf)?;
                    buf[transfer..transfer + length]
                        .copy_from_slice(&self.page_buf[offset..offset + length]);
                }
            } else if self.persistence {
                self.fault_in_page(k, whole, offset, length, &mut buf, transfer)?;
            } else {
                return Err(EngineError::MissingBlob { page: k });
            }

            transfer += length;
        }

        debug_assert_eq!(transfer, size as usize);
        Ok(buf)
    }

    /// Faults page `k` in from the backing file, promotes it into the
    /// buffer store, and marks it present. `whole` pages are faulted
    /// directly into the destination buffer; partial pages stage
    /// through `page_buf` so the whole P-byte blob can be promoted.
    fn fault_in_page(
        &mut self,
        k: u64,
        whole: bool,
        offset: usize,
        length: usize,
        buf: &mut [u8],
        transfer: usize,
    ) -> EngineResult<()> {
        let page_size = self.page_size;
        let page_start = k * page_size;
        // Use the backing file's actual on-disk size, not the in-memory
        // `eof`: writes only reach the buffer store until close() writes
        // back, so a page beyond what's physically persisted is a hole
        // that must read as zero rather than a short-read error.
        let backing_size = self
            .backing
            .as_ref()
            .expect("fault_in_page only called in persistent mode")
            .size()?;
        let expected = backing_size.saturating_sub(page_start).min(page_size) as usize;

        let promote = |target: &mut [u8], backing: &crate::backing::BackingFile| -> EngineResult<()> {
            target.fill(0);
            if expected > 0 {
                let n = backing.pread(&mut target[..expected], page_start)?;
                if n != expected {
                    return Err(EngineError::BackingIo(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("short read for page {k}: got {n}, expected {expected}"),
                    )));
                }
            }
            Ok(())
        };

        let backing = self
            .backing
            .as_ref()
            .expect("fault_in_page only called in persistent mode");

        if whole {
            promote(&mut buf[transfer..transfer + length], backing)?;
            self.store
                .bucket_put(&self.bucket, &blob_name(k), &buf[transfer..transfer + length])?;
        } else {
            promote(&mut self.page_buf, backing)?;
            self.store.bucket_put(&self.bucket, &blob_name(k), &self.page_buf)?;
            buf[transfer..transfer + length].copy_from_slice(&self.page_buf[offset..offset + length]);
        }
        self.present.insert(k);
        log::trace!("faulted in page {k} from backing file and promoted it to the buffer store");
        Ok(())
    }

    /// Fills `page_buf` with page `k`'s prior content ahead of a partial
    /// write: fetched from the buffer store if present, faulted from the
    /// backing file in persistent mode, or zeroed if neither holds it.
    /// `page_buf` is shared scratch, so this must run before every
    /// partial-page write rather than relying on whatever it last held.
    fn load_page_for_write(&mut self, k: u64) -> EngineResult<()> {
        if self.present.contains(k) {
            self.store.bucket_get(&self.bucket, &blob_name(k), &mut self.page_buf)?;
            return Ok(());
        }
        self.page_buf.fill(0);
        if self.persistence {
            let page_size = self.page_size;
            let page_start = k * page_size;
            let backing = self
                .backing
                .as_ref()
                .expect("persistence implies a backing file");
            let backing_size = backing.size()?;
            let expected = backing_size.saturating_sub(page_start).min(page_size) as usize;
            if expected > 0 {
                let n = backing.pread(&mut self.page_buf[..expected], page_start)?;
                if n != expected {
                    return Err(EngineError::BackingIo(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("short read for page {k}: got {n}, expected {expected}"),
                    )));
                }
            }
        }
        Ok(())
    }

    /// Writes `size` bytes from `buf` starting at `addr`, extending `eof`
    /// as needed. Partial first/last pages are updated via
    /// read-modify-write through `page_buf`.
    pub fn write(&mut self, addr: u64, size: u64, buf: &[u8]) -> EngineResult<()> {
        if self.page_buf.len() != self.page_size as usize {
            return Err(EngineError::Uninitialized);
        }
        if size == 0 {
            self.pos = Some(addr);
            self.op = LastOp::Write;
            return Ok(());
        }

        match self.write_inner(addr, size, buf) {
            Ok(()) => {
                self.pos = Some(addr + size);
                self.op = LastOp::Write;
                self.eof = self.eof.max(addr + size);
                Ok(())
            }
            Err(err) => {
                self.reset_after_error();
                Err(err)
            }
        }
    }

    fn write_inner(&mut self, addr: u64, size: u64, buf: &[u8]) -> EngineResult<()> {
        self.validate_request(addr, size)?;
        let last = addr + size - 1;
        let start = addr / self.page_size;
        let end = last / self.page_size;
        let page_size = self.page_size;
        let store = self.store.clone();
        let bucket = self.bucket.clone();

        let mut transfer = 0usize;
        for k in start..=end {
            let (offset, length) = page_overlap(k, page_size, addr, last);
            let whole = offset == 0 && length == page_size as usize;

            if whole {
                store.bucket_put(&bucket, &blob_name(k), &buf[transfer..transfer + length])?;
            } else {
                self.load_page_for_write(k)?;
                self.page_buf[offset..offset + length].copy_from_slice(&buf[transfer..transfer + length]);
                store.bucket_put(&bucket, &blob_name(k), &self.page_buf)?;
            }
            self.present.insert(k);
            transfer += length;
        }

        debug_assert_eq!(transfer, size as usize);
        Ok(())
    }
}
