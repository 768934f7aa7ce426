use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The inclusive window an owner offers a vehicle in, as sent over the
/// wire. Dates arrive date-only, so day-granularity comparisons never see
/// a time-of-day component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// First offered day
    pub start_date: NaiveDate,
    /// Last offered day, inclusive
    pub end_date: NaiveDate,
}

/// Structure representing a vehicle listing from the database
#[derive(Debug, Serialize)]
pub struct Vehicle {
    /// Unique identifier for the vehicle
    pub id: Uuid,
    /// User who listed the vehicle
    pub owner_id: Uuid,
    /// Where the stored vehicle image is served from
    pub image_url: String,
    /// Free-text pickup location
    pub location: String,
    /// Window the vehicle is offered in
    pub availability: AvailabilityWindow,
    /// When the listing was created
    pub created_at: DateTime<Utc>,
    /// When the listing was last updated
    pub updated_at: DateTime<Utc>,
}

/// Request structure for creating a vehicle listing
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    /// Free-text pickup location
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    /// Window the vehicle is offered in
    pub availability: AvailabilityWindow,

    /// Base64-encoded image bytes
    #[validate(length(min = 1, message = "Image is required"))]
    pub image_data: String,

    /// Original filename of the image
    #[validate(length(min = 1, message = "Image filename is required"))]
    pub image_filename: String,
}

/// Request structure for updating a vehicle listing. Absent fields keep
/// their current values.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    /// New pickup location
    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: Option<String>,

    /// New availability window
    pub availability: Option<AvailabilityWindow>,

    /// Replacement image, base64-encoded
    pub image_data: Option<String>,

    /// Filename of the replacement image
    pub image_filename: Option<String>,
}

/// Response structure for listing vehicles
#[derive(Debug, Serialize)]
pub struct ListVehiclesResponse {
    /// The vehicles
    pub vehicles: Vec<Vehicle>,
    /// Total count
    pub total: i64,
}

/// Custom error type for vehicle operations
#[derive(thiserror::Error, Debug)]
pub enum VehicleError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Vehicle not found
    #[error("Vehicle not found")]
    NotFound,

    /// Actor does not own the vehicle
    #[error("Only the owner can modify a vehicle listing")]
    Forbidden,

    /// Availability start after availability end
    #[error("Invalid availability window: start date must not be after end date")]
    InvalidDateRange,

    /// Upload bytes are not a supported image format
    #[error("Invalid image file")]
    InvalidImage,

    /// The media store failed to accept the image
    #[error("Media store error: {0}")]
    MediaStore(String),

    /// The booking engine failed while deriving availability
    #[error("Availability check failed: {0}")]
    Availability(String),
}

impl actix_web::ResponseError for VehicleError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            VehicleError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            VehicleError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "vehicle_not_found",
                "message": "Vehicle not found"
            })),
            VehicleError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "Only the owner can modify a vehicle listing"
            })),
            VehicleError::InvalidDateRange => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "invalid_date_range",
                    "message": "Availability start date must not be after end date"
                }))
            }
            VehicleError::InvalidImage => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_image",
                "message": "Uploaded file is not a supported image"
            })),
            VehicleError::MediaStore(_) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "media_store_error",
                "message": "Failed to store the vehicle image"
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
