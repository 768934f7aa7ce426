use reqwest::{Client, StatusCode};
use sqlx::{PgPool, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::types::{DeliveryOutcome, PushError, PushPayload, PushSubscription, SubscribeRequest};

/// How long push services may queue an undelivered message, in seconds.
const PUSH_TTL_SECONDS: u32 = 4 * 7 * 24 * 60 * 60;

/// True for response codes the push service uses to say the subscription
/// is permanently dead and should be dropped.
pub fn is_permanent_failure(status: StatusCode) -> bool {
    matches!(status.as_u16(), 404 | 410)
}

/// Service for keeping push subscriptions and delivering payloads to them.
pub struct PushService {
    pool: PgPool,
    client: Client,
}

impl PushService {
    /// Creates a new instance of `PushService` with the provided database
    /// connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            client: Client::new(),
        }
    }

    /// Registers or refreshes a subscription for the user. The same
    /// endpoint re-subscribing only updates its key material.
    pub async fn subscribe(
        &self,
        user_id: &Uuid,
        request: &SubscribeRequest,
    ) -> Result<(), PushError> {
        sqlx::query(
            r#"
            INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, endpoint) DO UPDATE SET
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth
            "#,
        )
        .bind(user_id)
        .bind(&request.endpoint)
        .bind(&request.keys.p256dh)
        .bind(&request.keys.auth)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches every subscription registered for a user.
    pub async fn subscriptions_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<PushSubscription>, PushError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, endpoint, p256dh, auth, created_at
            FROM push_subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let subscriptions = rows
            .into_iter()
            .map(|row| PushSubscription {
                id: row.get("id"),
                user_id: row.get("user_id"),
                endpoint: row.get("endpoint"),
                p256dh: row.get("p256dh"),
                auth: row.get("auth"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(subscriptions)
    }

    /// Deletes a subscription, typically after its endpoint reported a
    /// permanent failure.
    pub async fn remove_subscription(&self, subscription_id: &Uuid) -> Result<(), PushError> {
        sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Posts a payload to one subscription endpoint and classifies the
    /// response.
    pub async fn push_to_subscription(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<DeliveryOutcome, PushError> {
        let response = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", PUSH_TTL_SECONDS)
            .json(payload)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return Ok(DeliveryOutcome::Failed(
                    e.status().map(|s| s.as_u16()).unwrap_or(0),
                ));
            }
        };

        let status = response.status();
        if status.is_success() {
            Ok(DeliveryOutcome::Delivered)
        } else if is_permanent_failure(status) {
            Ok(DeliveryOutcome::Gone)
        } else {
            Ok(DeliveryOutcome::Failed(status.as_u16()))
        }
    }

    /// Best-effort delivery of a payload to every subscription a user
    /// holds. Dead endpoints are pruned; transient failures are logged and
    /// the subscription kept for next time.
    pub async fn notify_user(
        &self,
        user_id: &Uuid,
        payload: &PushPayload,
    ) -> Result<(), PushError> {
        let subscriptions = self.subscriptions_for_user(user_id).await?;

        if subscriptions.is_empty() {
            debug!("No push subscriptions for user {}", user_id);
            return Ok(());
        }

        for subscription in subscriptions {
            match self.push_to_subscription(&subscription, payload).await? {
                DeliveryOutcome::Delivered => {
                    debug!("Delivered push to {}", subscription.endpoint);
                }
                DeliveryOutcome::Gone => {
                    info!(
                        "Pruning dead push subscription {} for user {}",
                        subscription.id, user_id
                    );
                    self.remove_subscription(&subscription.id).await?;
                }
                DeliveryOutcome::Failed(status) => {
                    warn!(
                        "Push to {} failed with status {}, keeping subscription",
                        subscription.endpoint, status
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_failure_codes_prune() {
        assert!(is_permanent_failure(StatusCode::NOT_FOUND));
        assert!(is_permanent_failure(StatusCode::GONE));
    }

    #[test]
    fn test_transient_codes_keep_subscription() {
        assert!(!is_permanent_failure(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_permanent_failure(StatusCode::BAD_GATEWAY));
        assert!(!is_permanent_failure(StatusCode::CREATED));
    }

    #[test]
    fn test_payload_shape() {
        let payload = PushPayload {
            title: "Booking update".to_string(),
            body: "Your booking is approved.".to_string(),
            url: "/bookings".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Booking update");
        assert_eq!(json["body"], "Your booking is approved.");
        assert_eq!(json["url"], "/bookings");
    }
}
