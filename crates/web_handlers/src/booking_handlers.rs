use actix_web::{HttpResponse, Result, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use booking_engine::{BookingError, BookingService, DateRange, Decision};

/// Request structure for creating a booking. Dates are date-only values;
/// serde rejects anything carrying a time component, so day-granularity
/// comparisons are exact.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Vehicle to book
    pub vehicle_id: Uuid,

    /// First requested day
    pub start_date: NaiveDate,

    /// Last requested day, inclusive
    pub end_date: NaiveDate,
}

/// Request structure for deciding a pending booking
#[derive(Debug, Deserialize, Validate)]
pub struct DecideBookingRequest {
    /// The owner's verdict
    #[validate(custom(function = "validate_decision_status"))]
    pub status: String,
}

/// Response structure for listing bookings
#[derive(Debug, Serialize)]
pub struct ListBookingsResponse<T: Serialize> {
    /// The bookings
    pub bookings: Vec<T>,
    /// Total count
    pub total: i64,
}

/// Custom validation function for the decision status value
fn validate_decision_status(status: &str) -> Result<(), validator::ValidationError> {
    match status {
        "approved" | "rejected" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_decision_status")),
    }
}

fn parse_decision(status: &str) -> Option<Decision> {
    match status {
        "approved" => Some(Decision::Approve),
        "rejected" => Some(Decision::Reject),
        _ => None,
    }
}

/// Creates a new booking request on a vehicle for the authenticated user.
/// The booking starts out pending; the vehicle owner decides it later.
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    user: AuthenticatedUser,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    let range = DateRange::new(request.start_date, request.end_date)?;
    let booking = booking_service
        .create(&user.0, &request.vehicle_id, range)
        .await?;

    Ok(HttpResponse::Created().json(booking))
}

/// Gets all bookings requested by the authenticated user
pub async fn my_bookings(
    booking_service: web::Data<BookingService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, BookingError> {
    let bookings = booking_service.bookings_for_requester(&user.0).await?;

    let response = ListBookingsResponse {
        total: bookings.len() as i64,
        bookings,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Gets all bookings on vehicles the authenticated user owns
pub async fn owner_bookings(
    booking_service: web::Data<BookingService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, BookingError> {
    let bookings = booking_service.bookings_for_owner(&user.0).await?;

    let response = ListBookingsResponse {
        total: bookings.len() as i64,
        bookings,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Decides a pending booking. Only the vehicle owner may decide, an
/// approval re-checks the vehicle's approved bookings for overlap, and the
/// requester is notified of the outcome asynchronously.
pub async fn decide_booking(
    booking_service: web::Data<BookingService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    request: web::Json<DecideBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    // Validate the request
    request.validate().map_err(|_| {
        BookingError::Validation("Status must be approved or rejected".to_string())
    })?;

    let decision = parse_decision(&request.status)
        .ok_or_else(|| BookingError::Validation("Status must be approved or rejected".to_string()))?;

    let booking_id = path.into_inner();
    let booking = booking_service.decide(&booking_id, &user.0, decision).await?;

    Ok(HttpResponse::Ok().json(booking))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_status_values() {
        assert!(validate_decision_status("approved").is_ok());
        assert!(validate_decision_status("rejected").is_ok());
        assert!(validate_decision_status("pending").is_err());
        assert!(validate_decision_status("cancelled").is_err());
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(parse_decision("approved"), Some(Decision::Approve));
        assert_eq!(parse_decision("rejected"), Some(Decision::Reject));
        assert_eq!(parse_decision("maybe"), None);
    }

    #[test]
    fn test_create_booking_request_parses_date_only_values() {
        let body = r#"{
            "vehicle_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "start_date": "2024-06-05",
            "end_date": "2024-06-10"
        }"#;

        let request: CreateBookingRequest = serde_json::from_str(body).unwrap();
        assert_eq!(
            request.start_date,
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
        );
        assert_eq!(
            request.end_date,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );
    }

    #[test]
    fn test_create_booking_request_rejects_timestamps() {
        // Day granularity: datetime strings are not accepted, so stored
        // values can never disagree on time-of-day.
        let body = r#"{
            "vehicle_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "start_date": "2024-06-05T10:30:00Z",
            "end_date": "2024-06-10"
        }"#;

        assert!(serde_json::from_str::<CreateBookingRequest>(body).is_err());
    }
}
