//! Services module
//!
//! Lógica de negocio que coordina repositorios y storage.

pub mod vehicle_service;

pub use vehicle_service::VehicleService;
