use thiserror::Error;

/// Errors surfaced by the buffer-store adapter.
#[derive(Debug, Error)]
pub enum BufferStoreError {
    /// A buffer-store lock was poisoned by a panicking holder.
    #[error("buffer store lock poisoned")]
    LockPoisoned,
    #[error("bucket '{0}' not found")]
    NoSuchBucket(String),
    #[error("blob '{blob}' not found in bucket '{bucket}'")]
    NoSuchBlob { bucket: String, blob: String },
    #[error("blob '{blob}' has {actual} bytes, expected {expected}")]
    SizeMismatch {
        blob: String,
        expected: usize,
        actual: usize,
    },
    #[error("buffer-store service initialization failed: {0}")]
    InitFailed(String),
}

pub type BufferStoreResult<T> = Result<T, BufferStoreError>;
