use thiserror::Error;

/// Errors returned by the paged I/O engine and file object lifecycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid name, zero/overflowing maxaddr, undefined addr, or `addr+size` overflow.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The scratch page buffer was never allocated; indicates a programmer error.
    #[error("file object is not initialized (no scratch page buffer)")]
    Uninitialized,
    /// `pread`/`pwrite`/`fstat`/open/close failed, or a short read occurred away from EOF.
    #[error("backing file I/O error: {0}")]
    BackingIo(#[from] std::io::Error),
    /// A partial-page operation needed prior content for page `page` that no source holds.
    #[error("page {page} has no blob and no backing file to fault it in from")]
    MissingBlob { page: u64 },
    /// The buffer-store adapter failed.
    #[error("buffer store error: {0}")]
    Store(#[from] buffer_store::BufferStoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
