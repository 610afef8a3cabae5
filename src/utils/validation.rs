//! Utilidades de validación
//!
//! Validadores personalizados usados por los DTOs con `validator`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Placas: letras, dígitos y guiones
    pub static ref PLATE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9-]+$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Decodifica un payload base64 (alfabeto estándar)
pub fn decode_base64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(value.trim())
}
