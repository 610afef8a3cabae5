//! Entidades de referencia para los selectores del cliente

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Brand {
    pub id: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VehicleType {
    pub id: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentType {
    pub id: i32,
    pub description: String,
}

/// Procedimiento de taller que se registra en el historial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Procedure {
    pub id: i32,
    pub description: String,
}
