//! Vehicle Registry API
//!
//! API REST para el registro de vehículos: vehículos, marcas, tipos,
//! propietarios, fotos e historial, protegida con bearer tokens JWT.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;
