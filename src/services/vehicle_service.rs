//! Flujo de trabajo de vehículos
//!
//! Reglas de creación, lectura, reemplazo y borrado de vehículos.
//! Toda validación de negocio ocurre antes de subir blobs o escribir en el
//! store; el único fallo detectado después de escribir es la colisión de
//! concurrencia optimista en el update.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::{
    History, NewVehicle, UpdateOutcome, Vehicle, VehicleDetails, VehiclePhoto, VehicleUpdate,
};
use crate::repositories::vehicle_repository::DUPLICATE_PLATE_MESSAGE;
use crate::repositories::{IdentityGateway, LookupStore, VehicleStore};
use crate::storage::BlobStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Contenedor donde se guardan las fotos de vehículos
pub const VEHICLE_PHOTOS_CONTAINER: &str = "vehiclephotos";

pub const CONCURRENT_UPDATE_MESSAGE: &str = "El vehículo fue modificado por otra solicitud.";

#[derive(Clone)]
pub struct VehicleService {
    vehicles: Arc<dyn VehicleStore>,
    lookups: Arc<dyn LookupStore>,
    identity: Arc<dyn IdentityGateway>,
    blobs: Arc<dyn BlobStore>,
}

impl VehicleService {
    pub fn new(
        vehicles: Arc<dyn VehicleStore>,
        lookups: Arc<dyn LookupStore>,
        identity: Arc<dyn IdentityGateway>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            vehicles,
            lookups,
            identity,
            blobs,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<VehicleDetails>> {
        let vehicles = self.vehicles.list().await?;
        self.load_details(vehicles).await
    }

    pub async fn get(&self, id: i32) -> AppResult<VehicleDetails> {
        let vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;

        self.load_details(vec![vehicle])
            .await?
            .pop()
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<VehicleDetails> {
        let (user_id, image) = request.parse()?;

        let vehicle_type = self
            .lookups
            .find_vehicle_type(request.vehicle_type_id)
            .await?
            .ok_or_else(|| AppError::InvalidReference("El tipo de vehículo no existe.".to_string()))?;

        let brand = self
            .lookups
            .find_brand(request.brand_id)
            .await?
            .ok_or_else(|| AppError::InvalidReference("La marca no existe.".to_string()))?;

        let user = self
            .identity
            .resolve_user(user_id)
            .await?
            .ok_or_else(|| AppError::InvalidReference("El usuario no existe.".to_string()))?;

        if self.vehicles.find_by_plate(&request.plate).await?.is_some() {
            return Err(AppError::DuplicatePlate(DUPLICATE_PLATE_MESSAGE.to_string()));
        }

        let mut photo_ids = Vec::new();
        if !image.is_empty() {
            let image_id = self.blobs.upload(&image, VEHICLE_PHOTOS_CONTAINER).await?;
            tracing::debug!(
                "📷 Foto subida a {} ({}): {}",
                VEHICLE_PHOTOS_CONTAINER,
                self.blobs.storage_type(),
                image_id
            );
            photo_ids.push(image_id);
        }

        let new_vehicle = NewVehicle {
            plate: request.plate,
            color: request.color,
            line: request.line,
            model: request.model,
            remarks: request.remarks,
            user_id: user.id,
            brand_id: brand.id,
            vehicle_type_id: vehicle_type.id,
        };

        let vehicle = match self.vehicles.insert(new_vehicle, photo_ids.clone()).await {
            Ok(vehicle) => vehicle,
            Err(e) => {
                // el blob ya subido queda sin vehículo que lo referencie
                for image_id in &photo_ids {
                    tracing::warn!(
                        "⚠️  Foto {} huérfana en {}: el vehículo no se guardó ({})",
                        image_id,
                        VEHICLE_PHOTOS_CONTAINER,
                        e
                    );
                }
                return Err(e);
            }
        };
        tracing::info!("🚗 Vehículo {} creado con placa {}", vehicle.id, vehicle.plate);

        let photos = self.vehicles.photos_for(&[vehicle.id]).await?;
        Ok(VehicleDetails {
            vehicle,
            brand: Some(brand),
            vehicle_type: Some(vehicle_type),
            user: Some(user),
            photos,
            histories: Vec::new(),
        })
    }

    pub async fn update(&self, id: i32, request: UpdateVehicleRequest) -> AppResult<()> {
        if id != request.id {
            return Err(AppError::BadRequest(format!(
                "El id de la ruta ({}) no coincide con el del cuerpo ({})",
                id, request.id
            )));
        }
        request.validate()?;

        let update = VehicleUpdate {
            id,
            version: request.version,
            plate: request.plate,
            color: request.color,
            line: request.line,
            model: request.model,
            remarks: request.remarks,
            user_id: request.user_id,
            brand_id: request.brand_id,
            vehicle_type_id: request.vehicle_type_id,
        };

        match self.vehicles.update(&update).await? {
            UpdateOutcome::Updated => {
                tracing::info!("✏️  Vehículo {} actualizado", id);
                Ok(())
            }
            UpdateOutcome::Conflict => {
                if !self.vehicles.exists(id).await? {
                    return Err(not_found_error("Vehicle", id));
                }
                tracing::warn!("⚠️  Conflicto de concurrencia al actualizar vehículo {}", id);
                Err(AppError::Conflict(CONCURRENT_UPDATE_MESSAGE.to_string()))
            }
        }
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.vehicles.find_by_id(id).await?.is_none() {
            return Err(not_found_error("Vehicle", id));
        }

        if !self.vehicles.delete(id).await? {
            return Err(not_found_error("Vehicle", id));
        }

        tracing::info!("🗑️  Vehículo {} eliminado", id);
        Ok(())
    }

    /// Carga explícita de marca, tipo, propietario, fotos e historial.
    /// Una consulta por colección, sin importar cuántos vehículos haya.
    async fn load_details(&self, vehicles: Vec<Vehicle>) -> AppResult<Vec<VehicleDetails>> {
        if vehicles.is_empty() {
            return Ok(Vec::new());
        }

        let vehicle_ids: Vec<i32> = vehicles.iter().map(|v| v.id).collect();
        let mut user_ids: Vec<Uuid> = vehicles.iter().map(|v| v.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let (brands, vehicle_types, users, photos, histories) = tokio::try_join!(
            self.lookups.list_brands(),
            self.lookups.list_vehicle_types(),
            self.identity.resolve_users(&user_ids),
            self.vehicles.photos_for(&vehicle_ids),
            self.vehicles.histories_for(&vehicle_ids),
        )?;

        let brands: HashMap<_, _> = brands.into_iter().map(|b| (b.id, b)).collect();
        let vehicle_types: HashMap<_, _> = vehicle_types.into_iter().map(|t| (t.id, t)).collect();
        let users: HashMap<_, _> = users.into_iter().map(|u| (u.id, u)).collect();

        let mut photos_by_vehicle: HashMap<i32, Vec<VehiclePhoto>> = HashMap::new();
        for photo in photos {
            photos_by_vehicle.entry(photo.vehicle_id).or_default().push(photo);
        }
        // el store ya las entrega ordenadas por fecha
        let mut histories_by_vehicle: HashMap<i32, Vec<History>> = HashMap::new();
        for history in histories {
            histories_by_vehicle
                .entry(history.vehicle_id)
                .or_default()
                .push(history);
        }

        Ok(vehicles
            .into_iter()
            .map(|vehicle| VehicleDetails {
                brand: brands.get(&vehicle.brand_id).cloned(),
                vehicle_type: vehicle_types.get(&vehicle.vehicle_type_id).cloned(),
                user: users.get(&vehicle.user_id).cloned(),
                photos: photos_by_vehicle.remove(&vehicle.id).unwrap_or_default(),
                histories: histories_by_vehicle.remove(&vehicle.id).unwrap_or_default(),
                vehicle,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::repositories::InMemoryStore;
    use crate::storage::MemoryBlobStore;

    const IMAGE_B64: &str = "aW1hZ2UtYnl0ZXM="; // "image-bytes"

    struct Fixture {
        store: Arc<InMemoryStore>,
        blobs: Arc<MemoryBlobStore>,
        service: VehicleService,
        user_id: Uuid,
    }

    async fn fixture_with_blobs(blobs: MemoryBlobStore) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        store.add_brand(1, "Toyota").await;
        store.add_vehicle_type(1, "Carro").await;
        let user_id = Uuid::new_v4();
        store
            .add_user(User {
                id: user_id,
                first_name: "Juan".to_string(),
                last_name: "Pérez".to_string(),
                email: "juan@test.com".to_string(),
            })
            .await;

        let blobs = Arc::new(blobs);
        let service = VehicleService::new(store.clone(), store.clone(), store.clone(), blobs.clone());
        Fixture {
            store,
            blobs,
            service,
            user_id,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_blobs(MemoryBlobStore::new()).await
    }

    fn create_request(plate: &str, user_id: Uuid) -> CreateVehicleRequest {
        CreateVehicleRequest {
            plate: plate.to_string(),
            color: "red".to_string(),
            line: "Corolla".to_string(),
            model: 2020,
            remarks: Some("Sin novedades".to_string()),
            brand_id: 1,
            vehicle_type_id: 1,
            user_id: user_id.to_string(),
            image: None,
        }
    }

    fn update_request(vehicle: &Vehicle, color: &str) -> UpdateVehicleRequest {
        UpdateVehicleRequest {
            id: vehicle.id,
            version: vehicle.version,
            plate: vehicle.plate.clone(),
            color: color.to_string(),
            line: vehicle.line.clone(),
            model: vehicle.model,
            remarks: vehicle.remarks.clone(),
            brand_id: vehicle.brand_id,
            vehicle_type_id: vehicle.vehicle_type_id,
            user_id: vehicle.user_id,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_with_empty_collections() {
        let f = fixture().await;

        let details = f.service.create(create_request("ABC123", f.user_id)).await.unwrap();

        assert!(details.vehicle.id > 0);
        assert_eq!(details.vehicle.version, 1);
        assert!(details.photos.is_empty());
        assert!(details.histories.is_empty());
        assert_eq!(details.brand.unwrap().description, "Toyota");
        assert_eq!(details.user.unwrap().id, f.user_id);
        assert!(f.blobs.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_plate_ignoring_case_is_rejected() {
        let f = fixture().await;
        f.service.create(create_request("ABC123", f.user_id)).await.unwrap();
        let writes = f.store.write_count();

        let mut request = create_request("abc123", f.user_id);
        request.image = Some(IMAGE_B64.to_string());
        let err = f.service.create(request).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicatePlate(ref msg) if msg == DUPLICATE_PLATE_MESSAGE));
        assert_eq!(f.store.write_count(), writes);
        assert!(f.blobs.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_references_are_rejected_without_side_effects() {
        let f = fixture().await;

        let cases = [
            (1, 99, f.user_id, "El tipo de vehículo no existe."),
            (99, 1, f.user_id, "La marca no existe."),
            (1, 1, Uuid::new_v4(), "El usuario no existe."),
        ];

        for (brand_id, vehicle_type_id, user_id, expected) in cases {
            let mut request = create_request("XYZ987", user_id);
            request.brand_id = brand_id;
            request.vehicle_type_id = vehicle_type_id;
            request.image = Some(IMAGE_B64.to_string());

            let err = f.service.create(request).await.unwrap_err();
            assert!(
                matches!(err, AppError::InvalidReference(ref msg) if msg == expected),
                "unexpected error {:?}",
                err
            );
        }

        assert_eq!(f.store.write_count(), 0);
        assert!(f.blobs.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_vehicle_type_checked_before_brand() {
        let f = fixture().await;
        let mut request = create_request("XYZ987", Uuid::new_v4());
        request.brand_id = 99;
        request.vehicle_type_id = 99;

        let err = f.service.create(request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(ref msg) if msg == "El tipo de vehículo no existe."));
    }

    #[tokio::test]
    async fn test_invalid_shape_is_validation_error() {
        let f = fixture().await;
        let mut request = create_request("", f.user_id);
        request.image = Some(IMAGE_B64.to_string());

        let err = f.service.create(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(f.store.write_count(), 0);
        assert!(f.blobs.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_owner_and_image_reported_together() {
        let f = fixture().await;
        let mut request = create_request("ABC123", f.user_id);
        request.user_id = "u1".to_string();
        request.image = Some("%%%".to_string());
        request.color = String::new();

        match f.service.create(request).await.unwrap_err() {
            AppError::Validation(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("user_id"));
                assert!(fields.contains_key("image"));
                assert!(fields.contains_key("color"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(f.store.write_count(), 0);
        assert!(f.blobs.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_image_creates_exactly_one_photo() {
        let f = fixture().await;
        let mut request = create_request("ABC123", f.user_id);
        request.image = Some(IMAGE_B64.to_string());

        let details = f.service.create(request).await.unwrap();

        let uploads = f.blobs.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].container, VEHICLE_PHOTOS_CONTAINER);
        assert_eq!(uploads[0].data, b"image-bytes".to_vec());
        assert_eq!(details.photos.len(), 1);
        assert_eq!(details.photos[0].image_id, uploads[0].id);
        assert_eq!(details.photos[0].vehicle_id, details.vehicle.id);
    }

    #[tokio::test]
    async fn test_empty_image_skips_upload() {
        let f = fixture().await;
        let mut request = create_request("ABC123", f.user_id);
        request.image = Some(String::new());

        let details = f.service.create(request).await.unwrap();
        assert!(details.photos.is_empty());
        assert!(f.blobs.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_blob_failure_aborts_before_persisting() {
        let f = fixture_with_blobs(MemoryBlobStore::failing()).await;
        let mut request = create_request("ABC123", f.user_id);
        request.image = Some(IMAGE_B64.to_string());

        let err = f.service.create(request).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(f.store.write_count(), 0);
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let f = fixture().await;
        let a = f.service.create(create_request("AAA111", f.user_id)).await.unwrap();
        f.service.create(create_request("BBB222", f.user_id)).await.unwrap();

        let fetched = f.service.get(a.vehicle.id).await.unwrap();
        assert_eq!(fetched.vehicle, a.vehicle);

        let all = f.service.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.brand.is_some() && d.vehicle_type.is_some()));

        assert!(matches!(f.service.get(999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_attaches_collections_to_their_vehicle() {
        let f = fixture().await;
        let mut with_photo = create_request("AAA111", f.user_id);
        with_photo.image = Some(IMAGE_B64.to_string());
        let a = f.service.create(with_photo).await.unwrap();
        let b = f.service.create(create_request("BBB222", f.user_id)).await.unwrap();
        let c = f.service.create(create_request("CCC333", f.user_id)).await.unwrap();

        let now = chrono::Utc::now();
        f.store
            .add_history(b.vehicle.id, now, 20_000, Some("Frenos".to_string()))
            .await
            .unwrap();
        f.store
            .add_history(b.vehicle.id, now - chrono::Duration::days(30), 10_000, None)
            .await
            .unwrap();

        let all = f.service.list().await.unwrap();
        assert_eq!(all.len(), 3);

        let by_id = |id: i32| all.iter().find(|d| d.vehicle.id == id).unwrap();
        assert_eq!(by_id(a.vehicle.id).photos.len(), 1);
        assert!(by_id(a.vehicle.id).histories.is_empty());

        let histories = &by_id(b.vehicle.id).histories;
        assert!(by_id(b.vehicle.id).photos.is_empty());
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].mileage, 10_000);
        assert_eq!(histories[1].mileage, 20_000);

        let third = by_id(c.vehicle.id);
        assert!(third.photos.is_empty() && third.histories.is_empty());
        assert!(all.iter().all(|d| d.user.as_ref().map(|u| u.id) == Some(f.user_id)));
    }

    /// Store cuyo insert falla siempre, como si otra solicitud hubiera
    /// ganado la placa entre la verificación y la escritura
    struct LosingRaceStore(Arc<InMemoryStore>);

    #[async_trait::async_trait]
    impl VehicleStore for LosingRaceStore {
        async fn list(&self) -> AppResult<Vec<Vehicle>> {
            self.0.list().await
        }

        async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
            self.0.find_by_id(id).await
        }

        async fn find_by_plate(&self, plate: &str) -> AppResult<Option<Vehicle>> {
            self.0.find_by_plate(plate).await
        }

        async fn exists(&self, id: i32) -> AppResult<bool> {
            self.0.exists(id).await
        }

        async fn insert(&self, _vehicle: NewVehicle, _photo_ids: Vec<Uuid>) -> AppResult<Vehicle> {
            Err(AppError::DuplicatePlate(DUPLICATE_PLATE_MESSAGE.to_string()))
        }

        async fn update(&self, update: &VehicleUpdate) -> AppResult<UpdateOutcome> {
            self.0.update(update).await
        }

        async fn delete(&self, id: i32) -> AppResult<bool> {
            self.0.delete(id).await
        }

        async fn photos_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<VehiclePhoto>> {
            self.0.photos_for(vehicle_ids).await
        }

        async fn histories_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<History>> {
            self.0.histories_for(vehicle_ids).await
        }
    }

    #[tokio::test]
    async fn test_insert_failure_after_upload_propagates() {
        let f = fixture().await;
        let service = VehicleService::new(
            Arc::new(LosingRaceStore(f.store.clone())),
            f.store.clone(),
            f.store.clone(),
            f.blobs.clone(),
        );
        let mut request = create_request("ABC123", f.user_id);
        request.image = Some(IMAGE_B64.to_string());

        let err = service.create(request).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicatePlate(_)));
        // la foto ya estaba subida; solo queda registrada en el log
        assert_eq!(f.blobs.uploads().await.len(), 1);
        assert_eq!(f.store.photo_count().await, 0);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_state() {
        let f = fixture().await;
        let created = f.service.create(create_request("ABC123", f.user_id)).await.unwrap();

        f.service
            .update(created.vehicle.id, update_request(&created.vehicle, "black"))
            .await
            .unwrap();

        let stored = f.service.get(created.vehicle.id).await.unwrap().vehicle;
        assert_eq!(stored.color, "black");
        assert_eq!(stored.version, created.vehicle.version + 1);
    }

    #[tokio::test]
    async fn test_update_id_mismatch_performs_no_write() {
        let f = fixture().await;
        let created = f.service.create(create_request("ABC123", f.user_id)).await.unwrap();
        let writes = f.store.write_count();

        let err = f
            .service
            .update(created.vehicle.id + 1, update_request(&created.vehicle, "black"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(f.store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_concurrent_updates_one_wins() {
        let f = fixture().await;
        let created = f.service.create(create_request("ABC123", f.user_id)).await.unwrap();
        let id = created.vehicle.id;

        let first = update_request(&created.vehicle, "black");
        let second = update_request(&created.vehicle, "white");
        let (r1, r2) = tokio::join!(f.service.update(id, first), f.service.update(id, second));

        let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let failure = if r1.is_err() { r1 } else { r2 };
        assert!(matches!(failure, Err(AppError::Conflict(ref msg)) if msg == CONCURRENT_UPDATE_MESSAGE));

        let stored = f.service.get(id).await.unwrap().vehicle;
        assert_eq!(stored.version, 2);
        assert!(stored.color == "black" || stored.color == "white");
    }

    #[tokio::test]
    async fn test_update_to_other_vehicles_plate_is_conflict() {
        let f = fixture().await;
        f.service.create(create_request("ABC123", f.user_id)).await.unwrap();
        let other = f.service.create(create_request("XYZ987", f.user_id)).await.unwrap();

        let mut request = update_request(&other.vehicle, "red");
        request.plate = "abc123".to_string();
        let err = f.service.update(other.vehicle.id, request).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(ref msg) if msg == DUPLICATE_PLATE_MESSAGE));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);

        let stored = f.service.get(other.vehicle.id).await.unwrap().vehicle;
        assert_eq!(stored.plate, "XYZ987");
        assert_eq!(stored.version, other.vehicle.version);
    }

    #[tokio::test]
    async fn test_update_after_delete_is_not_found() {
        let f = fixture().await;
        let created = f.service.create(create_request("ABC123", f.user_id)).await.unwrap();
        let id = created.vehicle.id;

        f.service.delete(id).await.unwrap();

        let err = f
            .service
            .update(id, update_request(&created.vehicle, "black"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_and_missing_is_not_found() {
        let f = fixture().await;
        let mut request = create_request("ABC123", f.user_id);
        request.image = Some(IMAGE_B64.to_string());
        let created = f.service.create(request).await.unwrap();
        let id = created.vehicle.id;
        f.store
            .add_history(id, chrono::Utc::now(), 12_000, Some("Cambio de aceite".to_string()))
            .await
            .unwrap();

        f.service.delete(id).await.unwrap();

        assert_eq!(f.store.photo_count().await, 0);
        assert_eq!(f.store.history_count().await, 0);
        assert!(matches!(f.service.get(id).await, Err(AppError::NotFound(_))));

        let writes = f.store.write_count();
        assert!(matches!(f.service.delete(999).await, Err(AppError::NotFound(_))));
        assert_eq!(f.store.write_count(), writes);
    }
}
