use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{Brand, History, User, VehicleDetails, VehiclePhoto, VehicleType};
use crate::utils::validation::{decode_base64, validate_not_blank, PLATE_REGEX};

// Request para crear un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 10), regex = "PLATE_REGEX")]
    pub plate: String,

    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub color: String,

    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub line: String,

    #[validate(range(min = 1900, max = 2100))]
    pub model: i32,

    #[validate(length(max = 500))]
    pub remarks: Option<String>,

    pub brand_id: i32,

    pub vehicle_type_id: i32,

    pub user_id: String,

    /// Imagen codificada en base64
    pub image: Option<String>,
}

impl CreateVehicleRequest {
    /// Valida todos los campos y devuelve el propietario y la imagen ya
    /// decodificados. Los errores de formato se acumulan con los del derive.
    pub fn parse(&self) -> Result<(Uuid, Vec<u8>), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let user_id = Uuid::parse_str(&self.user_id).ok();
        if user_id.is_none() {
            errors.add("user_id", field_error("uuid", "El usuario no es un UUID válido."));
        }

        let image = match self.image.as_deref() {
            Some(encoded) => decode_base64(encoded).ok(),
            None => Some(Vec::new()),
        };
        if image.is_none() {
            errors.add("image", field_error("base64", "La imagen no es base64 válido."));
        }

        match (user_id, image) {
            (Some(user_id), Some(image)) if errors.errors().is_empty() => Ok((user_id, image)),
            _ => Err(errors),
        }
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

// Request para reemplazar un vehículo completo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub id: i32,

    pub version: i32,

    #[validate(length(min = 1, max = 10), regex = "PLATE_REGEX")]
    pub plate: String,

    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub color: String,

    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub line: String,

    #[validate(range(min = 1900, max = 2100))]
    pub model: i32,

    #[validate(length(max = 500))]
    pub remarks: Option<String>,

    pub brand_id: i32,

    pub vehicle_type_id: i32,

    pub user_id: Uuid,
}

// Response de foto
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePhotoResponse {
    pub id: i32,
    pub image_id: Uuid,
    pub image_url: String,
}

// Response de historial
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub mileage: i32,
    pub remarks: Option<String>,
}

// Response de propietario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

// Response de vehículo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    pub id: i32,
    pub plate: String,
    pub color: String,
    pub line: String,
    pub model: i32,
    pub remarks: Option<String>,
    pub version: i32,
    pub brand_id: i32,
    pub vehicle_type_id: i32,
    pub user_id: Uuid,
    pub brand: Option<Brand>,
    pub vehicle_type: Option<VehicleType>,
    pub user: Option<OwnerResponse>,
    pub vehicle_photos: Vec<VehiclePhotoResponse>,
    pub histories: Vec<HistoryResponse>,
    pub created_at: DateTime<Utc>,
}

impl VehiclePhotoResponse {
    pub fn new(photo: VehiclePhoto, blob_public_url: &str) -> Self {
        Self {
            id: photo.id,
            image_url: format!(
                "{}/{}/{}",
                blob_public_url,
                crate::services::vehicle_service::VEHICLE_PHOTOS_CONTAINER,
                photo.image_id
            ),
            image_id: photo.image_id,
        }
    }
}

impl From<History> for HistoryResponse {
    fn from(history: History) -> Self {
        Self {
            id: history.id,
            date: history.date,
            mileage: history.mileage,
            remarks: history.remarks,
        }
    }
}

impl From<User> for OwnerResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name(),
            email: user.email,
        }
    }
}

impl VehicleResponse {
    pub fn from_details(details: VehicleDetails, blob_public_url: &str) -> Self {
        let VehicleDetails {
            vehicle,
            brand,
            vehicle_type,
            user,
            photos,
            histories,
        } = details;

        Self {
            id: vehicle.id,
            plate: vehicle.plate,
            color: vehicle.color,
            line: vehicle.line,
            model: vehicle.model,
            remarks: vehicle.remarks,
            version: vehicle.version,
            brand_id: vehicle.brand_id,
            vehicle_type_id: vehicle.vehicle_type_id,
            user_id: vehicle.user_id,
            brand,
            vehicle_type,
            user: user.map(OwnerResponse::from),
            vehicle_photos: photos
                .into_iter()
                .map(|p| VehiclePhotoResponse::new(p, blob_public_url))
                .collect(),
            histories: histories.into_iter().map(HistoryResponse::from).collect(),
            created_at: vehicle.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateVehicleRequest {
        CreateVehicleRequest {
            plate: "ABC123".to_string(),
            color: "red".to_string(),
            line: "Corolla".to_string(),
            model: 2020,
            remarks: None,
            brand_id: 1,
            vehicle_type_id: 1,
            user_id: "6f1f5a2e-2b1c-4c7e-9a55-0c5b2f6f3d11".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_valid_create_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_invalid_create_request_fields() {
        let request = CreateVehicleRequest {
            plate: "ABC 123 LONG".to_string(),
            color: "  ".to_string(),
            model: 1800,
            user_id: "u1".to_string(),
            image: Some("***".to_string()),
            ..valid_request()
        };

        let errors = request.parse().unwrap_err();
        let fields = errors.field_errors();
        for field in ["plate", "color", "model", "user_id", "image"] {
            assert!(fields.contains_key(field), "expected error on {}", field);
        }
        assert!(!fields.contains_key("line"));
    }

    #[test]
    fn test_parse_decodes_owner_and_image() {
        let owner = Uuid::new_v4();
        let request = CreateVehicleRequest {
            user_id: owner.to_string(),
            image: Some("aGVsbG8=".to_string()),
            ..valid_request()
        };

        let (user_id, image) = request.parse().unwrap();
        assert_eq!(user_id, owner);
        assert_eq!(image, b"hello".to_vec());

        let (_, image) = valid_request().parse().unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_create_request_uses_camel_case() {
        let request: CreateVehicleRequest = serde_json::from_value(serde_json::json!({
            "plate": "XYZ987",
            "color": "blue",
            "line": "Mazda 3",
            "model": 2019,
            "brandId": 2,
            "vehicleTypeId": 1,
            "userId": "6f1f5a2e-2b1c-4c7e-9a55-0c5b2f6f3d11"
        }))
        .unwrap();

        assert_eq!(request.brand_id, 2);
        assert!(request.image.is_none());
        assert!(request.remarks.is_none());
    }

    #[test]
    fn test_photo_url() {
        let image_id = Uuid::new_v4();
        let photo = VehiclePhoto {
            id: 1,
            vehicle_id: 1,
            image_id,
        };
        let response = VehiclePhotoResponse::new(photo, "https://cdn.test/blobs");
        assert_eq!(
            response.image_url,
            format!("https://cdn.test/blobs/vehiclephotos/{}", image_id)
        );
    }
}
