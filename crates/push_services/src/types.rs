use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A browser push subscription as persisted. One user may hold several,
/// one per browser/device.
#[derive(Debug, Clone)]
pub struct PushSubscription {
    /// Unique identifier for the subscription
    pub id: Uuid,
    /// User the subscription delivers to
    pub user_id: Uuid,
    /// Push-service endpoint URL the browser handed out
    pub endpoint: String,
    /// Client public key from the subscription
    pub p256dh: String,
    /// Client auth secret from the subscription
    pub auth: String,
    /// When the subscription was registered
    pub created_at: DateTime<Utc>,
}

/// Request structure for registering a push subscription
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    /// Push-service endpoint URL
    #[validate(length(min = 1, message = "Endpoint is required"))]
    pub endpoint: String,

    /// Subscription key material
    pub keys: SubscriptionKeys,
}

/// Key material of a push subscription
#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
    /// Client public key
    pub p256dh: String,
    /// Client auth secret
    pub auth: String,
}

/// Payload delivered to a subscription endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    /// Notification title
    pub title: String,
    /// Notification body text
    pub body: String,
    /// Where the client should navigate on click
    pub url: String,
}

/// Outcome of one delivery attempt to one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The push service accepted the message
    Delivered,
    /// The subscription no longer exists and should be pruned
    Gone,
    /// Transient or unexpected failure; the subscription is kept
    Failed(u16),
}

/// Custom error type for push operations
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for PushError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            PushError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
