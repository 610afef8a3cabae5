use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::BlobStore;
use crate::utils::errors::{AppError, AppResult};

/// Blob guardado en memoria
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub id: Uuid,
    pub container: String,
    pub data: Vec<u8>,
}

/// Blob store en memoria; puede configurarse para fallar
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<Vec<StoredBlob>>,
    failing: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store cuyas subidas siempre fallan
    pub fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }

    pub async fn uploads(&self) -> Vec<StoredBlob> {
        self.blobs.lock().await.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, data: &[u8], container: &str) -> AppResult<Uuid> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Storage("Blob store no disponible".to_string()));
        }

        let id = Uuid::new_v4();
        self.blobs.lock().await.push(StoredBlob {
            id,
            container: container.to_string(),
            data: data.to_vec(),
        });
        Ok(id)
    }

    fn storage_type(&self) -> &'static str {
        "memory"
    }
}
