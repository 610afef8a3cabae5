use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{History, NewVehicle, UpdateOutcome, Vehicle, VehiclePhoto, VehicleUpdate};
use crate::utils::errors::{AppError, AppResult};

pub const DUPLICATE_PLATE_MESSAGE: &str = "Ya existe un vehículo con esa placa.";

/// Gateway de persistencia para vehículos y sus colecciones propias
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Vehicle>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>>;

    /// Búsqueda de placa sin distinguir mayúsculas
    async fn find_by_plate(&self, plate: &str) -> AppResult<Option<Vehicle>>;

    async fn exists(&self, id: i32) -> AppResult<bool>;

    /// Inserta el vehículo y sus fotos en una sola unidad de trabajo
    async fn insert(&self, vehicle: NewVehicle, photo_ids: Vec<Uuid>) -> AppResult<Vehicle>;

    /// Reemplaza el estado completo si la versión coincide
    async fn update(&self, update: &VehicleUpdate) -> AppResult<UpdateOutcome>;

    /// Elimina el vehículo junto con fotos e historial. Devuelve false si no existía.
    async fn delete(&self, id: i32) -> AppResult<bool>;

    /// Fotos de varios vehículos en una sola consulta
    async fn photos_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<VehiclePhoto>>;

    /// Historial de varios vehículos, ordenado por fecha
    async fn histories_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<History>>;
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Traduce violaciones de restricciones a errores de negocio.
/// `duplicate` construye el error para la placa repetida: al crear es una
/// petición inválida, al actualizar un conflicto.
fn map_write_error(error: sqlx::Error, duplicate: fn(String) -> AppError) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return duplicate(DUPLICATE_PLATE_MESSAGE.to_string());
        }
        if db_error.is_foreign_key_violation() {
            return AppError::InvalidReference(
                "La marca, el tipo de vehículo o el usuario no existe.".to_string(),
            );
        }
    }
    AppError::Database(error)
}

#[async_trait]
impl VehicleStore for VehicleRepository {
    async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn find_by_plate(&self, plate: &str) -> AppResult<Option<Vehicle>> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE UPPER(plate) = UPPER($1)")
                .bind(plate)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    async fn insert(&self, vehicle: NewVehicle, photo_ids: Vec<Uuid>) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (plate, color, line, model, remarks, user_id, brand_id, vehicle_type_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&vehicle.plate)
        .bind(&vehicle.color)
        .bind(&vehicle.line)
        .bind(vehicle.model)
        .bind(&vehicle.remarks)
        .bind(vehicle.user_id)
        .bind(vehicle.brand_id)
        .bind(vehicle.vehicle_type_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, AppError::DuplicatePlate))?;

        for image_id in photo_ids {
            sqlx::query("INSERT INTO vehicle_photos (vehicle_id, image_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(image_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn update(&self, update: &VehicleUpdate) -> AppResult<UpdateOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET plate = $3, color = $4, line = $5, model = $6, remarks = $7,
                user_id = $8, brand_id = $9, vehicle_type_id = $10, version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(update.id)
        .bind(update.version)
        .bind(&update.plate)
        .bind(&update.color)
        .bind(&update.line)
        .bind(update.model)
        .bind(&update.remarks)
        .bind(update.user_id)
        .bind(update.brand_id)
        .bind(update.vehicle_type_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, AppError::Conflict))?;

        if result.rows_affected() == 0 {
            Ok(UpdateOutcome::Conflict)
        } else {
            Ok(UpdateOutcome::Updated)
        }
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        // fotos e historial caen por ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn photos_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<VehiclePhoto>> {
        let photos = sqlx::query_as::<_, VehiclePhoto>(
            "SELECT * FROM vehicle_photos WHERE vehicle_id = ANY($1) ORDER BY id",
        )
        .bind(vehicle_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn histories_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<History>> {
        let histories = sqlx::query_as::<_, History>(
            "SELECT * FROM histories WHERE vehicle_id = ANY($1) ORDER BY date, id",
        )
        .bind(vehicle_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(histories)
    }
}
