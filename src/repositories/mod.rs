//! Repositorios
//!
//! Gateways de persistencia (traits) con su implementación PostgreSQL
//! y una implementación en memoria.

pub mod lookup_repository;
pub mod memory_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use lookup_repository::{LookupRepository, LookupStore};
pub use memory_repository::InMemoryStore;
pub use user_repository::{IdentityGateway, UserRepository};
pub use vehicle_repository::{VehicleRepository, VehicleStore};
