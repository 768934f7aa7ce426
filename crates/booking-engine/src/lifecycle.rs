use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::booking_types::{
    Booking, BookingError, BookingStatus, Decision, OwnerBooking, RequesterBooking,
};
use crate::date_range::DateRange;
use crate::ledger::AvailabilityLedger;

/// Errors a notifier implementation may report. They are logged and
/// swallowed at the spawn boundary; a decision's outcome never depends on
/// notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Delivery error
    #[error("Delivery error: {0}")]
    Delivery(String),
}

/// Trait for services that tell a requester about the decision on their
/// booking.
#[async_trait::async_trait]
pub trait DecisionNotifier: Send + Sync {
    /// Delivers a best-effort notification that `booking_id` is now
    /// `status` to `user_id`.
    async fn notify_decision(
        &self,
        user_id: &Uuid,
        booking_id: &Uuid,
        status: BookingStatus,
    ) -> Result<(), NotifyError>;
}

/// Per-vehicle mutual exclusion for decisions. Serializing the
/// approvability re-check with the status write closes the
/// read-check-then-write race between two concurrent approvals on the same
/// vehicle.
#[derive(Clone, Default)]
pub struct VehicleLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

impl VehicleLocks {
    /// Creates an empty lock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding decisions on the given vehicle, creating
    /// it on first use.
    pub fn lock_for(&self, vehicle_id: &Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(*vehicle_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

/// Service governing booking creation and owner decisions.
pub struct BookingService {
    pool: PgPool,
    ledger: AvailabilityLedger,
    locks: VehicleLocks,
    notifier: Arc<dyn DecisionNotifier>,
}

impl BookingService {
    /// Creates the service over the shared pool and notifier. The ledger
    /// reads through the same pool so every check sees committed state.
    pub fn new(pool: PgPool, notifier: Arc<dyn DecisionNotifier>) -> Self {
        Self {
            ledger: AvailabilityLedger::new(pool.clone()),
            locks: VehicleLocks::new(),
            pool,
            notifier,
        }
    }

    /// Creates a booking in `pending` for the requester. The range must be
    /// inside the vehicle's window and clear of approved bookings at this
    /// instant; overlapping pending requests are allowed and resolved at
    /// decision time.
    pub async fn create(
        &self,
        requester: &Uuid,
        vehicle_id: &Uuid,
        range: DateRange,
    ) -> Result<Booking, BookingError> {
        self.ledger.check_creatable(vehicle_id, &range).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO bookings (vehicle_id, requester_id, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, vehicle_id, requester_id, start_date, end_date,
                      status, created_at, updated_at
            "#,
        )
        .bind(vehicle_id)
        .bind(requester)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        let booking = booking_from_row(&row)?;
        info!(
            "Created pending booking {} on vehicle {}",
            booking.id, vehicle_id
        );

        Ok(booking)
    }

    /// Fetches a booking by id.
    pub async fn get(&self, booking_id: &Uuid) -> Result<Booking, BookingError> {
        let row = sqlx::query(
            r#"
            SELECT id, vehicle_id, requester_id, start_date, end_date,
                   status, created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => booking_from_row(&row),
            None => Err(BookingError::BookingNotFound),
        }
    }

    /// Commits the owner's decision on a pending booking.
    ///
    /// Decisions on a vehicle are serialized by its lock, and the write
    /// itself is conditional on the status still being `pending`, so two
    /// racing approvals of overlapping bookings can never both land. A
    /// decision lost to a concurrent writer reports the same way as a
    /// conflict found up front.
    pub async fn decide(
        &self,
        booking_id: &Uuid,
        actor: &Uuid,
        decision: Decision,
    ) -> Result<Booking, BookingError> {
        let booking = self.get(booking_id).await?;
        let owner = self.vehicle_owner(&booking.vehicle_id).await?;

        if owner != *actor {
            return Err(BookingError::Forbidden);
        }

        let vehicle_lock = self.locks.lock_for(&booking.vehicle_id);
        let _guard = vehicle_lock.lock().await;

        // State may have moved while we waited on the lock.
        let booking = self.get(booking_id).await?;
        if booking.status.is_terminal() {
            return Err(BookingError::InvalidTransition);
        }

        if decision == Decision::Approve {
            self.ledger.check_approvable(&booking).await?;
        }

        let target = decision.target_status();
        let row = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = 'pending'
            RETURNING id, vehicle_id, requester_id, start_date, end_date,
                      status, created_at, updated_at
            "#,
        )
        .bind(target.as_str())
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        let updated = match row {
            Some(row) => booking_from_row(&row)?,
            // A concurrent writer got there between our check and the
            // conditional update. For approvals the caller cannot tell this
            // apart from an up-front conflict, and should not need to.
            None => {
                debug!("Lost decision race on booking {}", booking_id);
                return Err(match decision {
                    Decision::Approve => BookingError::Overlap,
                    Decision::Reject => BookingError::InvalidTransition,
                });
            }
        };

        info!(
            "Booking {} on vehicle {} is now {}",
            updated.id,
            updated.vehicle_id,
            updated.status.as_str()
        );

        // Exactly one notification per successful decision, handed off so
        // the decision response never waits on delivery.
        let notifier = self.notifier.clone();
        let requester = updated.requester_id;
        let notify_booking = updated.id;
        let status = updated.status;
        tokio::spawn(async move {
            if let Err(e) = notifier
                .notify_decision(&requester, &notify_booking, status)
                .await
            {
                error!("Failed to notify booking {} decision: {}", notify_booking, e);
            }
        });

        Ok(updated)
    }

    /// All bookings requested by a user, newest first, with a vehicle
    /// summary for display.
    pub async fn bookings_for_requester(
        &self,
        requester: &Uuid,
    ) -> Result<Vec<RequesterBooking>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.vehicle_id, b.start_date, b.end_date, b.status,
                   b.created_at, v.location, v.image_url
            FROM bookings b
            LEFT JOIN vehicles v ON b.vehicle_id = v.id
            WHERE b.requester_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(requester)
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            bookings.push(RequesterBooking {
                id: row.get("id"),
                vehicle_id: row.get("vehicle_id"),
                start_date: row.get("start_date"),
                end_date: row.get("end_date"),
                status: parse_status(&row)?,
                created_at: row.get("created_at"),
                vehicle_location: row
                    .get::<Option<String>, _>("location")
                    .unwrap_or_else(|| "Unknown vehicle".to_string()),
                vehicle_image_url: row
                    .get::<Option<String>, _>("image_url")
                    .unwrap_or_default(),
            });
        }

        Ok(bookings)
    }

    /// All bookings on vehicles the actor owns, newest first.
    pub async fn bookings_for_owner(
        &self,
        owner: &Uuid,
    ) -> Result<Vec<OwnerBooking>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.vehicle_id, b.requester_id, b.start_date, b.end_date,
                   b.status, b.created_at, v.location
            FROM bookings b
            JOIN vehicles v ON b.vehicle_id = v.id
            WHERE v.owner_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            bookings.push(OwnerBooking {
                id: row.get("id"),
                vehicle_id: row.get("vehicle_id"),
                requester_id: row.get("requester_id"),
                start_date: row.get("start_date"),
                end_date: row.get("end_date"),
                status: parse_status(&row)?,
                created_at: row.get("created_at"),
                vehicle_location: row.get("location"),
            });
        }

        Ok(bookings)
    }

    async fn vehicle_owner(&self, vehicle_id: &Uuid) -> Result<Uuid, BookingError> {
        let row = sqlx::query("SELECT owner_id FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.get("owner_id")),
            None => Err(BookingError::VehicleNotFound),
        }
    }
}

fn parse_status(row: &PgRow) -> Result<BookingStatus, BookingError> {
    let status: String = row.get("status");
    BookingStatus::parse(&status)
        .ok_or_else(|| BookingError::DataFormat(format!("unknown status: {}", status)))
}

fn booking_from_row(row: &PgRow) -> Result<Booking, BookingError> {
    Ok(Booking {
        id: row.get("id"),
        vehicle_id: row.get("vehicle_id"),
        requester_id: row.get("requester_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: parse_status(row)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_same_vehicle_shares_a_lock() {
        let locks = VehicleLocks::new();
        let vehicle = Uuid::new_v4();

        let first = locks.lock_for(&vehicle);
        let second = locks.lock_for(&vehicle);

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_different_vehicles_use_different_locks() {
        let locks = VehicleLocks::new();

        let first = locks.lock_for(&Uuid::new_v4());
        let second = locks.lock_for(&Uuid::new_v4());

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_lock_serializes_critical_sections() {
        let locks = VehicleLocks::new();
        let vehicle = Uuid::new_v4();
        let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let lock = locks.lock_for(&vehicle);
            let trace = trace.clone();
            handles.push(tokio::spawn(async move {
                let _guard = lock.lock().await;
                trace.lock().unwrap().push("enter");
                tokio::time::sleep(Duration::from_millis(10)).await;
                trace.lock().unwrap().push("exit");
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Sections never interleave: every enter is followed by its exit.
        let trace = trace.lock().unwrap();
        assert_eq!(*trace, vec!["enter", "exit", "enter", "exit"]);
    }
}
