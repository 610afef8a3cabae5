//! Repositorio en memoria
//!
//! Implementa los tres gateways de persistencia sobre un único estado
//! protegido por `RwLock`. Se usa en tests y para levantar el servicio
//! sin PostgreSQL. Respeta las mismas restricciones que el esquema SQL:
//! placa única sin distinguir mayúsculas, claves foráneas y borrado en cascada.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::lookup_repository::LookupStore;
use super::user_repository::IdentityGateway;
use super::vehicle_repository::{VehicleStore, DUPLICATE_PLATE_MESSAGE};
use crate::models::{
    Brand, DocumentType, History, NewVehicle, Procedure, UpdateOutcome, User, Vehicle,
    VehiclePhoto, VehicleType, VehicleUpdate,
};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct MemoryData {
    vehicles: BTreeMap<i32, Vehicle>,
    photos: Vec<VehiclePhoto>,
    histories: Vec<History>,
    brands: BTreeMap<i32, Brand>,
    vehicle_types: BTreeMap<i32, VehicleType>,
    document_types: BTreeMap<i32, DocumentType>,
    procedures: BTreeMap<i32, Procedure>,
    users: HashMap<Uuid, User>,
    next_vehicle_id: i32,
    next_photo_id: i32,
    next_history_id: i32,
}

impl MemoryData {
    fn plate_taken(&self, plate: &str, except: Option<i32>) -> bool {
        self.vehicles
            .values()
            .any(|v| Some(v.id) != except && v.plate.eq_ignore_ascii_case(plate))
    }

    fn check_references(&self, brand_id: i32, vehicle_type_id: i32, user_id: Uuid) -> AppResult<()> {
        if !self.brands.contains_key(&brand_id)
            || !self.vehicle_types.contains_key(&vehicle_type_id)
            || !self.users.contains_key(&user_id)
        {
            return Err(AppError::InvalidReference(
                "La marca, el tipo de vehículo o el usuario no existe.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<MemoryData>,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_brand(&self, id: i32, description: &str) {
        let mut data = self.data.write().await;
        data.brands.insert(
            id,
            Brand {
                id,
                description: description.to_string(),
            },
        );
    }

    pub async fn add_vehicle_type(&self, id: i32, description: &str) {
        let mut data = self.data.write().await;
        data.vehicle_types.insert(
            id,
            VehicleType {
                id,
                description: description.to_string(),
            },
        );
    }

    pub async fn add_document_type(&self, id: i32, description: &str) {
        let mut data = self.data.write().await;
        data.document_types.insert(
            id,
            DocumentType {
                id,
                description: description.to_string(),
            },
        );
    }

    pub async fn add_procedure(&self, id: i32, description: &str) {
        let mut data = self.data.write().await;
        data.procedures.insert(
            id,
            Procedure {
                id,
                description: description.to_string(),
            },
        );
    }

    pub async fn add_user(&self, user: User) {
        let mut data = self.data.write().await;
        data.users.insert(user.id, user);
    }

    /// Agrega un registro de historial (lo hacen otros flujos en producción)
    pub async fn add_history(
        &self,
        vehicle_id: i32,
        date: DateTime<Utc>,
        mileage: i32,
        remarks: Option<String>,
    ) -> AppResult<History> {
        let mut data = self.data.write().await;
        if !data.vehicles.contains_key(&vehicle_id) {
            return Err(AppError::InvalidReference("El vehículo no existe.".to_string()));
        }

        data.next_history_id += 1;
        let history = History {
            id: data.next_history_id,
            vehicle_id,
            date,
            mileage,
            remarks,
        };
        data.histories.push(history.clone());
        Ok(history)
    }

    /// Número de escrituras (insert, update, delete) que llegaron al store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn photo_count(&self) -> usize {
        self.data.read().await.photos.len()
    }

    pub async fn history_count(&self) -> usize {
        self.data.read().await.histories.len()
    }
}

#[async_trait]
impl VehicleStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.data.read().await.vehicles.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Vehicle>> {
        Ok(self.data.read().await.vehicles.get(&id).cloned())
    }

    async fn find_by_plate(&self, plate: &str) -> AppResult<Option<Vehicle>> {
        let data = self.data.read().await;
        Ok(data
            .vehicles
            .values()
            .find(|v| v.plate.eq_ignore_ascii_case(plate))
            .cloned())
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.data.read().await.vehicles.contains_key(&id))
    }

    async fn insert(&self, vehicle: NewVehicle, photo_ids: Vec<Uuid>) -> AppResult<Vehicle> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut data = self.data.write().await;

        if data.plate_taken(&vehicle.plate, None) {
            return Err(AppError::DuplicatePlate(DUPLICATE_PLATE_MESSAGE.to_string()));
        }
        data.check_references(vehicle.brand_id, vehicle.vehicle_type_id, vehicle.user_id)?;

        data.next_vehicle_id += 1;
        let created = Vehicle {
            id: data.next_vehicle_id,
            plate: vehicle.plate,
            color: vehicle.color,
            line: vehicle.line,
            model: vehicle.model,
            remarks: vehicle.remarks,
            user_id: vehicle.user_id,
            brand_id: vehicle.brand_id,
            vehicle_type_id: vehicle.vehicle_type_id,
            version: 1,
            created_at: Utc::now(),
        };

        for image_id in photo_ids {
            data.next_photo_id += 1;
            let photo = VehiclePhoto {
                id: data.next_photo_id,
                vehicle_id: created.id,
                image_id,
            };
            data.photos.push(photo);
        }

        data.vehicles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, update: &VehicleUpdate) -> AppResult<UpdateOutcome> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut data = self.data.write().await;

        let matches = data
            .vehicles
            .get(&update.id)
            .map_or(false, |current| current.version == update.version);
        if !matches {
            return Ok(UpdateOutcome::Conflict);
        }

        if data.plate_taken(&update.plate, Some(update.id)) {
            return Err(AppError::Conflict(DUPLICATE_PLATE_MESSAGE.to_string()));
        }
        data.check_references(update.brand_id, update.vehicle_type_id, update.user_id)?;

        if let Some(current) = data.vehicles.get_mut(&update.id) {
            current.plate = update.plate.clone();
            current.color = update.color.clone();
            current.line = update.line.clone();
            current.model = update.model;
            current.remarks = update.remarks.clone();
            current.user_id = update.user_id;
            current.brand_id = update.brand_id;
            current.vehicle_type_id = update.vehicle_type_id;
            current.version += 1;
        }

        Ok(UpdateOutcome::Updated)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut data = self.data.write().await;

        if data.vehicles.remove(&id).is_none() {
            return Ok(false);
        }
        data.photos.retain(|p| p.vehicle_id != id);
        data.histories.retain(|h| h.vehicle_id != id);
        Ok(true)
    }

    async fn photos_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<VehiclePhoto>> {
        let data = self.data.read().await;
        Ok(data
            .photos
            .iter()
            .filter(|p| vehicle_ids.contains(&p.vehicle_id))
            .cloned()
            .collect())
    }

    async fn histories_for(&self, vehicle_ids: &[i32]) -> AppResult<Vec<History>> {
        let data = self.data.read().await;
        let mut histories: Vec<History> = data
            .histories
            .iter()
            .filter(|h| vehicle_ids.contains(&h.vehicle_id))
            .cloned()
            .collect();
        histories.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(histories)
    }
}

#[async_trait]
impl LookupStore for InMemoryStore {
    async fn find_brand(&self, id: i32) -> AppResult<Option<Brand>> {
        Ok(self.data.read().await.brands.get(&id).cloned())
    }

    async fn find_vehicle_type(&self, id: i32) -> AppResult<Option<VehicleType>> {
        Ok(self.data.read().await.vehicle_types.get(&id).cloned())
    }

    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        let mut brands: Vec<Brand> = self.data.read().await.brands.values().cloned().collect();
        brands.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(brands)
    }

    async fn list_vehicle_types(&self) -> AppResult<Vec<VehicleType>> {
        let mut vehicle_types: Vec<VehicleType> =
            self.data.read().await.vehicle_types.values().cloned().collect();
        vehicle_types.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(vehicle_types)
    }

    async fn list_document_types(&self) -> AppResult<Vec<DocumentType>> {
        let mut document_types: Vec<DocumentType> =
            self.data.read().await.document_types.values().cloned().collect();
        document_types.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(document_types)
    }

    async fn list_procedures(&self) -> AppResult<Vec<Procedure>> {
        let mut procedures: Vec<Procedure> =
            self.data.read().await.procedures.values().cloned().collect();
        procedures.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(procedures)
    }
}

#[async_trait]
impl IdentityGateway for InMemoryStore {
    async fn resolve_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.data.read().await.users.get(&id).cloned())
    }

    async fn resolve_users(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(ids.iter().filter_map(|id| data.users.get(id).cloned()).collect())
    }
}
