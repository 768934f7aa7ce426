use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::info;

use push_services::{PushDispatcher, PushService, spawn_dispatcher};

/// How many decision notifications may sit in the queue before enqueuing
/// waits; decisions are low-volume, so this never fills in practice.
const DISPATCH_QUEUE_SIZE: usize = 256;

/// Manager for the push notification dispatch system
/// Integrates with the web server to deliver booking decisions in the
/// background
pub struct NotifyManager {
    pool: PgPool,
    worker_handle: Option<JoinHandle<()>>,
}

impl NotifyManager {
    /// Create a new notify manager
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            worker_handle: None,
        }
    }

    /// Start the dispatch worker and return the queue handle the booking
    /// engine notifies through
    pub fn start(&mut self) -> PushDispatcher {
        info!("Starting push notification dispatcher");

        let push_service = PushService::new(self.pool.clone());
        let (dispatcher, handle) = spawn_dispatcher(push_service, DISPATCH_QUEUE_SIZE);

        self.worker_handle = Some(handle);

        info!("Push notification dispatcher started successfully");
        dispatcher
    }

    /// Stop the dispatch worker
    pub async fn stop(&mut self) {
        info!("Stopping push notification dispatcher");

        if let Some(handle) = self.worker_handle.take() {
            handle.abort();
            let _ = handle.await;
        }

        info!("Push notification dispatcher stopped");
    }
}

impl Drop for NotifyManager {
    fn drop(&mut self) {
        if let Some(handle) = self.worker_handle.take() {
            handle.abort();
        }
    }
}
