use actix_web::{HttpResponse, Result, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use booking_engine::{AvailabilityLedger, BookingError, DateRange};
use media_store::{ImageKind, ImageStore, sniff_image};

use crate::vehicle_service::VehicleService;
use crate::vehicle_types::*;

/// Decodes and sniffs a base64 image payload, rejecting anything that is
/// not a supported image format.
fn decode_image(image_data: &str) -> Result<(Vec<u8>, ImageKind), VehicleError> {
    let bytes = BASE64
        .decode(image_data)
        .map_err(|_| VehicleError::Validation("Image data is not valid base64".to_string()))?;

    let kind = sniff_image(&bytes).ok_or(VehicleError::InvalidImage)?;
    Ok((bytes, kind))
}

fn window_range(window: &AvailabilityWindow) -> Result<DateRange, VehicleError> {
    DateRange::new(window.start_date, window.end_date)
        .map_err(|_| VehicleError::InvalidDateRange)
}

/// Public listing of vehicles bookable today: window covers the current
/// day and at least one day is still free of approved bookings.
pub async fn list_vehicles(pool: web::Data<sqlx::PgPool>) -> Result<HttpResponse, VehicleError> {
    let vehicle_service = VehicleService::new(pool.get_ref().clone());
    let vehicles = vehicle_service.available_vehicles().await?;

    let response = ListVehiclesResponse {
        total: vehicles.len() as i64,
        vehicles,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Gets the authenticated owner's vehicle listings
pub async fn my_vehicles(
    pool: web::Data<sqlx::PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, VehicleError> {
    let vehicle_service = VehicleService::new(pool.get_ref().clone());
    let vehicles = vehicle_service.vehicles_for_owner(&user.0).await?;

    let response = ListVehiclesResponse {
        total: vehicles.len() as i64,
        vehicles,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Gets a single vehicle listing by ID
pub async fn get_vehicle(
    pool: web::Data<sqlx::PgPool>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, VehicleError> {
    let vehicle_id = path.into_inner();
    let vehicle_service = VehicleService::new(pool.get_ref().clone());
    let vehicle = vehicle_service.get_vehicle(&vehicle_id).await?;

    Ok(HttpResponse::Ok().json(vehicle))
}

/// Creates a new vehicle listing for the authenticated user
pub async fn create_vehicle(
    pool: web::Data<sqlx::PgPool>,
    image_store: web::Data<dyn ImageStore>,
    user: AuthenticatedUser,
    request: web::Json<CreateVehicleRequest>,
) -> Result<HttpResponse, VehicleError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| VehicleError::Validation(format!("Validation error: {}", e)))?;

    let window = window_range(&request.availability)?;
    let (bytes, kind) = decode_image(&request.image_data)?;

    let image_url = image_store
        .store(bytes, &request.image_filename, kind)
        .await
        .map_err(|e| VehicleError::MediaStore(e.to_string()))?;

    let vehicle_service = VehicleService::new(pool.get_ref().clone());
    let vehicle = vehicle_service
        .create_vehicle(&user.0, &request.location, &window, &image_url)
        .await?;

    Ok(HttpResponse::Created().json(vehicle))
}

/// Updates a vehicle listing; only the owner may update
pub async fn update_vehicle(
    pool: web::Data<sqlx::PgPool>,
    image_store: web::Data<dyn ImageStore>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<UpdateVehicleRequest>,
) -> Result<HttpResponse, VehicleError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| VehicleError::Validation(format!("Validation error: {}", e)))?;

    let vehicle_id = path.into_inner();

    let window = match &request.availability {
        Some(window) => Some(window_range(window)?),
        None => None,
    };

    // If an image is included, validate and re-upload
    let image_url = match &request.image_data {
        Some(image_data) => {
            let filename = request.image_filename.as_deref().unwrap_or("vehicle");
            let (bytes, kind) = decode_image(image_data)?;

            let url = image_store
                .store(bytes, filename, kind)
                .await
                .map_err(|e| VehicleError::MediaStore(e.to_string()))?;
            Some(url)
        }
        None => None,
    };

    let vehicle_service = VehicleService::new(pool.get_ref().clone());
    let vehicle = vehicle_service
        .update_vehicle(
            &user.0,
            &vehicle_id,
            request.location.as_deref(),
            window.as_ref(),
            image_url.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(vehicle))
}

/// Deletes a vehicle listing; only the owner may delete
pub async fn delete_vehicle(
    pool: web::Data<sqlx::PgPool>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, VehicleError> {
    let vehicle_id = path.into_inner();
    let vehicle_service = VehicleService::new(pool.get_ref().clone());
    vehicle_service.delete_vehicle(&user.0, &vehicle_id).await?;

    log::info!("Vehicle {} deleted by owner {}", vehicle_id, user.0);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Vehicle deleted"
    })))
}

/// Calendar projection for a vehicle: its availability window plus every
/// booking's range and status
pub async fn vehicle_calendar(
    pool: web::Data<sqlx::PgPool>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let vehicle_id = path.into_inner();
    let ledger = AvailabilityLedger::new(pool.get_ref().clone());
    let calendar = ledger.vehicle_calendar(&vehicle_id).await?;

    Ok(HttpResponse::Ok().json(calendar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_image_accepts_base64_jpeg() {
        let encoded = BASE64.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02]);
        let (bytes, kind) = decode_image(&encoded).unwrap();

        assert_eq!(kind, ImageKind::Jpeg);
        assert_eq!(bytes.len(), 6);
    }

    #[test]
    fn test_decode_image_rejects_bad_base64() {
        let result = decode_image("not base64!!!");
        assert!(matches!(result, Err(VehicleError::Validation(_))));
    }

    #[test]
    fn test_decode_image_rejects_non_image_bytes() {
        let encoded = BASE64.encode(b"just some text");
        let result = decode_image(&encoded);
        assert!(matches!(result, Err(VehicleError::InvalidImage)));
    }
}
