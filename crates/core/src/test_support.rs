//! In-memory `ObjectStore` with call counters for orchestration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;

use crate::storage::{ObjectStore, PutOutcome, StorageError, content_digest};

/// Object recorded by [`MockStore::put`].
#[derive(Debug, Clone)]
pub(crate) struct StoredObject {
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub(crate) struct MockStore {
    pub puts: AtomicUsize,
    pub probes: AtomicUsize,
    pub put_fails: AtomicBool,
    pub probe_fails: AtomicBool,
    pub probe_delay: Duration,
    pub objects: Mutex<Vec<StoredObject>>,
}

impl MockStore {
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn stored(&self) -> Vec<StoredObject> {
        self.objects.lock().expect("mock lock poisoned").clone()
    }
}

impl ObjectStore for MockStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutOutcome, StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        // Let sibling uploads interleave like real network calls
        tokio::task::yield_now().await;

        if self.put_fails.load(Ordering::SeqCst) {
            return Err(StorageError::operation("bucket unavailable"));
        }

        let outcome = PutOutcome {
            etag: format!("\"{}\"", content_digest(&data)),
            size: data.len() as u64,
        };
        self.objects
            .lock()
            .expect("mock lock poisoned")
            .push(StoredObject {
                key: key.to_string(),
                data,
                content_type: content_type.to_string(),
            });
        Ok(outcome)
    }

    async fn probe(&self) -> Result<(), StorageError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }
        if self.probe_fails.load(Ordering::SeqCst) {
            return Err(StorageError::operation("connection refused"));
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://bucket.example.com/{key}")
    }
}
