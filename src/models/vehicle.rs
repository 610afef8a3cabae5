//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus colecciones propias
//! (fotos e historial) y la vista con las entidades relacionadas cargadas.
//! Mapea al schema PostgreSQL con primary key serial 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::lookup::{Brand, VehicleType};
use super::user::User;

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub plate: String,
    pub color: String,
    pub line: String,
    pub model: i32,
    pub remarks: Option<String>,
    pub user_id: Uuid,
    pub brand_id: i32,
    pub vehicle_type_id: i32,
    /// Token de concurrencia optimista, se incrementa en cada update
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// Datos para insertar un vehículo nuevo
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub plate: String,
    pub color: String,
    pub line: String,
    pub model: i32,
    pub remarks: Option<String>,
    pub user_id: Uuid,
    pub brand_id: i32,
    pub vehicle_type_id: i32,
}

/// Estado completo que reemplaza a un vehículo existente
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleUpdate {
    pub id: i32,
    /// Versión leída por el cliente
    pub version: i32,
    pub plate: String,
    pub color: String,
    pub line: String,
    pub model: i32,
    pub remarks: Option<String>,
    pub user_id: Uuid,
    pub brand_id: i32,
    pub vehicle_type_id: i32,
}

/// Resultado de un update con concurrencia optimista
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// Ninguna fila coincidió con (id, version)
    Conflict,
}

/// Foto de un vehículo, apunta a un blob en el contenedor de fotos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VehiclePhoto {
    pub id: i32,
    pub vehicle_id: i32,
    pub image_id: Uuid,
}

/// Registro de servicio o incidente de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct History {
    pub id: i32,
    pub vehicle_id: i32,
    pub date: DateTime<Utc>,
    pub mileage: i32,
    pub remarks: Option<String>,
}

/// Vehículo con sus entidades relacionadas cargadas explícitamente
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDetails {
    pub vehicle: Vehicle,
    pub brand: Option<Brand>,
    pub vehicle_type: Option<VehicleType>,
    pub user: Option<User>,
    pub photos: Vec<VehiclePhoto>,
    pub histories: Vec<History>,
}
