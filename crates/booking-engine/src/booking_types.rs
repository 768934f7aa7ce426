use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_range::DateRange;

/// Lifecycle state of a booking. `Pending` is the only non-terminal state;
/// an approved or rejected booking is never decided again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Requested by a renter, awaiting the owner's decision
    Pending,
    /// Granted by the owner; holds exclusive claim to its date range
    Approved,
    /// Declined by the owner
    Rejected,
}

impl BookingStatus {
    /// Database/wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    /// Parses the database/wire representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "approved" => Some(BookingStatus::Approved),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    /// True when no further transition is defined for this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

/// An owner's verdict on a pending booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Grant the booking its date range
    Approve,
    /// Decline the booking
    Reject,
}

impl Decision {
    /// The terminal status this decision commits.
    pub fn target_status(&self) -> BookingStatus {
        match self {
            Decision::Approve => BookingStatus::Approved,
            Decision::Reject => BookingStatus::Rejected,
        }
    }
}

/// A booking record as persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// Vehicle the booking claims days on
    pub vehicle_id: Uuid,
    /// User who requested the booking
    pub requester_id: Uuid,
    /// First requested day
    pub start_date: NaiveDate,
    /// Last requested day, inclusive
    pub end_date: NaiveDate,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The booking's requested days as a range.
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// A requester's booking joined with its vehicle summary.
#[derive(Debug, Serialize)]
pub struct RequesterBooking {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// Vehicle the booking claims days on
    pub vehicle_id: Uuid,
    /// First requested day
    pub start_date: NaiveDate,
    /// Last requested day, inclusive
    pub end_date: NaiveDate,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// Location of the vehicle
    pub vehicle_location: String,
    /// Image of the vehicle
    pub vehicle_image_url: String,
}

/// A booking on one of an owner's vehicles, as shown to the owner.
#[derive(Debug, Serialize)]
pub struct OwnerBooking {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// Vehicle the booking claims days on
    pub vehicle_id: Uuid,
    /// User who requested the booking
    pub requester_id: Uuid,
    /// First requested day
    pub start_date: NaiveDate,
    /// Last requested day, inclusive
    pub end_date: NaiveDate,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// Location of the vehicle
    pub vehicle_location: String,
}

/// Calendar projection for a vehicle: its offered window plus every
/// booking's range and status, so clients can render pending and approved
/// days distinctly.
#[derive(Debug, Serialize)]
pub struct VehicleCalendar {
    /// The window the owner offers the vehicle in
    pub availability: DateRange,
    /// Ranges claimed by bookings of any status
    pub bookings: Vec<CalendarEntry>,
}

/// One booked range in a vehicle's calendar.
#[derive(Debug, Serialize)]
pub struct CalendarEntry {
    /// First booked day
    pub start_date: NaiveDate,
    /// Last booked day, inclusive
    pub end_date: NaiveDate,
    /// Lifecycle state of the booking claiming the range
    pub status: BookingStatus,
}

/// Custom error type for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Start date after end date
    #[error("Invalid date range: start date must not be after end date")]
    InvalidDateRange,

    /// Requested range not contained in the vehicle's availability window
    #[error("Requested dates fall outside the vehicle's availability window")]
    OutOfWindow,

    /// An approved booking already occupies part of the range
    #[error("Vehicle is already booked during this period")]
    Overlap,

    /// Vehicle not found
    #[error("Vehicle not found")]
    VehicleNotFound,

    /// Booking not found
    #[error("Booking not found")]
    BookingNotFound,

    /// Actor is not the vehicle's owner
    #[error("Only the vehicle owner can decide a booking")]
    Forbidden,

    /// Booking is no longer pending
    #[error("Booking has already been decided")]
    InvalidTransition,

    /// Data format error
    #[error("Data format error: {0}")]
    DataFormat(String),
}

impl actix_web::ResponseError for BookingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            BookingError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            BookingError::InvalidDateRange => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_date_range",
                "message": "Start date must not be after end date"
            })),
            BookingError::OutOfWindow => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "out_of_window",
                "message": "Requested dates fall outside the vehicle's availability window"
            })),
            BookingError::Overlap => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "overlap",
                "message": "Vehicle is already booked during this period"
            })),
            BookingError::VehicleNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "vehicle_not_found",
                "message": "Vehicle not found"
            })),
            BookingError::BookingNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "booking_not_found",
                "message": "Booking not found"
            })),
            BookingError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "Only the vehicle owner can decide a booking"
            })),
            BookingError::InvalidTransition => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_transition",
                "message": "Booking has already been decided"
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::Rejected,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(BookingStatus::Approved.is_terminal());
        assert!(BookingStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_decision_targets() {
        assert_eq!(Decision::Approve.target_status(), BookingStatus::Approved);
        assert_eq!(Decision::Reject.target_status(), BookingStatus::Rejected);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }
}
