//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL del registro de vehículos.

pub mod lookup;
pub mod user;
pub mod vehicle;

pub use lookup::{Brand, DocumentType, Procedure, VehicleType};
pub use user::User;
pub use vehicle::{
    History, NewVehicle, UpdateOutcome, Vehicle, VehicleDetails, VehiclePhoto, VehicleUpdate,
};
