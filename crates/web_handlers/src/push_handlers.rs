use actix_web::{HttpResponse, Result, web};
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use push_services::{PushError, PushService, SubscribeRequest};

/// Returns the VAPID public key clients subscribe with. The key pair
/// belongs to the external push setup; this only hands out the public half.
pub async fn push_public_key() -> Result<HttpResponse> {
    let key = std::env::var("VAPID_PUBLIC_KEY").unwrap_or_default();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "key": key })))
}

/// Registers (or refreshes) a push subscription for the authenticated user
pub async fn push_subscribe(
    pool: web::Data<sqlx::PgPool>,
    user: AuthenticatedUser,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, PushError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| PushError::Validation(format!("Validation error: {}", e)))?;

    let push_service = PushService::new(pool.get_ref().clone());
    push_service.subscribe(&user.0, &request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
