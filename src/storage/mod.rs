//! Almacenamiento de blobs
//!
//! Gateway para guardar las fotos subidas. Cada blob se guarda dentro de
//! un contenedor y se identifica con un UUID opaco.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::utils::errors::AppResult;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

/// Storage provider de blobs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Sube el contenido al contenedor y devuelve su identificador
    async fn upload(&self, data: &[u8], container: &str) -> AppResult<Uuid>;

    /// Nombre del tipo de storage, para logs
    fn storage_type(&self) -> &'static str;
}
