use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Brand, DocumentType, Procedure, VehicleType};
use crate::utils::errors::AppResult;

/// Gateway de solo lectura para las tablas de referencia
#[async_trait]
pub trait LookupStore: Send + Sync {
    async fn find_brand(&self, id: i32) -> AppResult<Option<Brand>>;

    async fn find_vehicle_type(&self, id: i32) -> AppResult<Option<VehicleType>>;

    async fn list_brands(&self) -> AppResult<Vec<Brand>>;

    async fn list_vehicle_types(&self) -> AppResult<Vec<VehicleType>>;

    async fn list_document_types(&self) -> AppResult<Vec<DocumentType>>;

    async fn list_procedures(&self) -> AppResult<Vec<Procedure>>;
}

pub struct LookupRepository {
    pool: PgPool,
}

impl LookupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupStore for LookupRepository {
    async fn find_brand(&self, id: i32) -> AppResult<Option<Brand>> {
        let brand = sqlx::query_as::<_, Brand>("SELECT id, description FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(brand)
    }

    async fn find_vehicle_type(&self, id: i32) -> AppResult<Option<VehicleType>> {
        let vehicle_type = sqlx::query_as::<_, VehicleType>(
            "SELECT id, description FROM vehicle_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle_type)
    }

    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        let brands =
            sqlx::query_as::<_, Brand>("SELECT id, description FROM brands ORDER BY description")
                .fetch_all(&self.pool)
                .await?;

        Ok(brands)
    }

    async fn list_vehicle_types(&self) -> AppResult<Vec<VehicleType>> {
        let vehicle_types = sqlx::query_as::<_, VehicleType>(
            "SELECT id, description FROM vehicle_types ORDER BY description",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicle_types)
    }

    async fn list_document_types(&self) -> AppResult<Vec<DocumentType>> {
        let document_types = sqlx::query_as::<_, DocumentType>(
            "SELECT id, description FROM document_types ORDER BY description",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(document_types)
    }

    async fn list_procedures(&self) -> AppResult<Vec<Procedure>> {
        let procedures = sqlx::query_as::<_, Procedure>(
            "SELECT id, description FROM procedures ORDER BY description",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(procedures)
    }
}
