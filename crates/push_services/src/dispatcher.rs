use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use booking_engine::{BookingStatus, DecisionNotifier, NotifyError};

use crate::service::PushService;
use crate::types::PushPayload;

/// One queued decision notification.
#[derive(Debug)]
struct NotificationJob {
    user_id: Uuid,
    booking_id: Uuid,
    status: BookingStatus,
}

/// Queue handle the booking engine notifies through. Cheap to clone;
/// enqueuing never does network or database work itself.
#[derive(Clone)]
pub struct PushDispatcher {
    sender: mpsc::Sender<NotificationJob>,
}

/// Spawns the delivery worker and returns the dispatcher feeding it. The
/// worker drains jobs one at a time; anything that goes wrong with a job
/// is logged and dropped there, never surfaced to the decide path.
pub fn spawn_dispatcher(service: PushService, buffer: usize) -> (PushDispatcher, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<NotificationJob>(buffer);

    let handle = tokio::spawn(async move {
        info!("Push dispatcher started");

        while let Some(job) = receiver.recv().await {
            let payload = PushPayload {
                title: "Booking update".to_string(),
                body: format!("Your booking is {}.", job.status.as_str()),
                url: "/bookings".to_string(),
            };

            if let Err(e) = service.notify_user(&job.user_id, &payload).await {
                error!(
                    "Push delivery for booking {} to user {} failed: {}",
                    job.booking_id, job.user_id, e
                );
            }
        }

        info!("Push dispatcher stopped");
    });

    (PushDispatcher { sender }, handle)
}

#[async_trait::async_trait]
impl DecisionNotifier for PushDispatcher {
    async fn notify_decision(
        &self,
        user_id: &Uuid,
        booking_id: &Uuid,
        status: BookingStatus,
    ) -> Result<(), NotifyError> {
        self.sender
            .send(NotificationJob {
                user_id: *user_id,
                booking_id: *booking_id,
                status,
            })
            .await
            .map_err(|e| NotifyError::Delivery(format!("Dispatcher queue closed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The worker side needs a database; here we only check the queue
    // handle's behavior once the worker is gone.
    #[tokio::test]
    async fn test_send_after_worker_shutdown_reports_delivery_error() {
        let (sender, receiver) = mpsc::channel::<NotificationJob>(4);
        drop(receiver);

        let dispatcher = PushDispatcher { sender };
        let result = dispatcher
            .notify_decision(&Uuid::new_v4(), &Uuid::new_v4(), BookingStatus::Approved)
            .await;

        assert!(matches!(result, Err(NotifyError::Delivery(_))));
    }
}
