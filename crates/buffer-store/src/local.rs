use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{BucketHandle, BufferStore, BufferStoreError, BufferStoreResult};

type Buckets = HashMap<String, HashMap<String, Vec<u8>>>;

/// In-process reference implementation of [`BufferStore`].
///
/// Keeps every bucket's blobs in memory, keyed by blob name. This is the
/// implementation the engine uses in tests and in standalone operation; a
/// real deployment would instead bind against a multi-tier buffering
/// service reachable through the same trait.
#[derive(Default)]
pub struct LocalBufferStore {
    buckets: Mutex<Buckets>,
}

impl LocalBufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> BufferStoreResult<MutexGuard<'_, Buckets>> {
        self.buckets.lock().map_err(|_| BufferStoreError::LockPoisoned)
    }
}

impl BufferStore for LocalBufferStore {
    fn bucket_create(&self, name: &str) -> BufferStoreResult<BucketHandle> {
        let mut buckets = self.lock_state()?;
        buckets.entry(name.to_string()).or_default();
        Ok(BucketHandle(name.to_string()))
    }

    fn bucket_close(&self, _bucket: &BucketHandle) -> BufferStoreResult<()> {
        // Blobs are retained; only bucket_destroy tears them down.
        Ok(())
    }

    fn bucket_destroy(&self, bucket: &BucketHandle) -> BufferStoreResult<()> {
        let mut buckets = self.lock_state()?;
        buckets.remove(&bucket.0);
        Ok(())
    }

    fn bucket_contains(&self, bucket: &BucketHandle, blob_name: &str) -> bool {
        let Ok(buckets) = self.lock_state() else {
            return false;
        };
        buckets
            .get(&bucket.0)
            .is_some_and(|blobs| blobs.contains_key(blob_name))
    }

    fn bucket_get(
        &self,
        bucket: &BucketHandle,
        blob_name: &str,
        out: &mut [u8],
    ) -> BufferStoreResult<()> {
        let buckets = self.lock_state()?;
        let blobs = buckets
            .get(&bucket.0)
            .ok_or_else(|| BufferStoreError::NoSuchBucket(bucket.0.clone()))?;
        let blob = blobs.get(blob_name).ok_or_else(|| BufferStoreError::NoSuchBlob {
            bucket: bucket.0.clone(),
            blob: blob_name.to_string(),
        })?;
        if blob.len() != out.len() {
            return Err(BufferStoreError::SizeMismatch {
                blob: blob_name.to_string(),
                expected: out.len(),
                actual: blob.len(),
            });
        }
        out.copy_from_slice(blob);
        Ok(())
    }

    fn bucket_put(&self, bucket: &BucketHandle, blob_name: &str, data: &[u8]) -> BufferStoreResult<()> {
        let mut buckets = self.lock_state()?;
        let blobs = buckets
            .entry(bucket.0.clone())
            .or_default();
        blobs.insert(blob_name.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let store = LocalBufferStore::new();
        let bucket = store.bucket_create("file.h5").unwrap();
        store.bucket_put(&bucket, "0\n", &[1, 2, 3, 4]).unwrap();

        let mut out = [0u8; 4];
        store.bucket_get(&bucket, "0\n", &mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(store.bucket_contains(&bucket, "0\n"));
        assert!(!store.bucket_contains(&bucket, "1\n"));
    }

    #[test]
    fn destroy_removes_blobs_close_keeps_them() {
        let store = LocalBufferStore::new();
        let bucket = store.bucket_create("a").unwrap();
        store.bucket_put(&bucket, "0\n", &[9]).unwrap();

        store.bucket_close(&bucket).unwrap();
        assert!(store.bucket_contains(&bucket, "0\n"));

        store.bucket_destroy(&bucket).unwrap();
        assert!(!store.bucket_contains(&bucket, "0\n"));
    }

    #[test]
    fn get_missing_blob_errors() {
        let store = LocalBufferStore::new();
        let bucket = store.bucket_create("a").unwrap();
        let mut out = [0u8; 4];
        let err = store.bucket_get(&bucket, "7\n", &mut out).unwrap_err();
        assert!(matches!(err, BufferStoreError::NoSuchBlob { .. }));
    }

    #[test]
    fn size_mismatch_errors() {
        let store = LocalBufferStore::new();
        let bucket = store.bucket_create("a").unwrap();
        store.bucket_put(&bucket, "0\n", &[1, 2, 3]).unwrap();
        let mut out = [0u8; 4];
        let err = store.bucket_get(&bucket, "0\n", &mut out).unwrap_err();
        assert!(matches!(err, BufferStoreError::SizeMismatch { .. }));
    }
}
