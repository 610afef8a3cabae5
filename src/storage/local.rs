use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::BlobStore;
use crate::utils::errors::{AppError, AppResult};

/// Blobs guardados en el sistema de archivos local: `<base>/<container>/<uuid>`
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn blob_path(&self, container: &str, id: Uuid) -> PathBuf {
        self.base_path.join(container).join(id.to_string())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, data: &[u8], container: &str) -> AppResult<Uuid> {
        if container.is_empty() || container.contains(['/', '\\', '.']) {
            return Err(AppError::Storage(format!("Contenedor inválido: '{}'", container)));
        }

        let id = Uuid::new_v4();
        let full_path = self.blob_path(container, id);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Error creando {:?}: {}", parent, e)))?;
        }

        let mut file = fs::File::create(&full_path)
            .await
            .map_err(|e| AppError::Storage(format!("Error creando {:?}: {}", full_path, e)))?;
        file.write_all(data)
            .await
            .map_err(|e| AppError::Storage(format!("Error escribiendo {:?}: {}", full_path, e)))?;
        file.flush()
            .await
            .map_err(|e| AppError::Storage(format!("Error escribiendo {:?}: {}", full_path, e)))?;

        tracing::debug!("Blob guardado en {:?} ({} bytes)", full_path, data.len());
        Ok(id)
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}
