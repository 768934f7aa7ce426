use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::booking_types::{Booking, BookingError, BookingStatus, CalendarEntry, VehicleCalendar};
use crate::date_range::DateRange;

/// Scans a set of approved ranges for one overlapping the candidate,
/// returning its index. Booking counts per vehicle are small, so a linear
/// scan is enough; a sorted-interval index could replace this without
/// changing the callers.
pub fn find_conflict(candidate: &DateRange, approved: &[DateRange]) -> Option<usize> {
    approved.iter().position(|taken| taken.overlaps(candidate))
}

/// Per-vehicle authority over which days are grantable. The approved-day
/// view is derived from the booking set on every check; nothing here caches
/// between calls.
pub struct AvailabilityLedger {
    pool: PgPool,
}

impl AvailabilityLedger {
    /// Creates a ledger over the given database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the availability window a vehicle is offered in.
    pub async fn vehicle_window(&self, vehicle_id: &Uuid) -> Result<DateRange, BookingError> {
        let row = sqlx::query(
            "SELECT availability_start, availability_end FROM vehicles WHERE id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(DateRange {
                start: row.get("availability_start"),
                end: row.get("availability_end"),
            }),
            None => Err(BookingError::VehicleNotFound),
        }
    }

    /// Fetches the ranges of a vehicle's approved bookings, optionally
    /// leaving out one booking (used when re-checking that same booking at
    /// approval time).
    pub async fn approved_ranges(
        &self,
        vehicle_id: &Uuid,
        exclude: Option<&Uuid>,
    ) -> Result<Vec<DateRange>, BookingError> {
        let rows = match exclude {
            Some(booking_id) => {
                sqlx::query(
                    r#"
                    SELECT start_date, end_date
                    FROM bookings
                    WHERE vehicle_id = $1 AND status = 'approved' AND id <> $2
                    "#,
                )
                .bind(vehicle_id)
                .bind(booking_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT start_date, end_date
                    FROM bookings
                    WHERE vehicle_id = $1 AND status = 'approved'
                    "#,
                )
                .bind(vehicle_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let ranges = rows
            .into_iter()
            .map(|row| DateRange {
                start: row.get("start_date"),
                end: row.get("end_date"),
            })
            .collect();

        Ok(ranges)
    }

    /// Advisory check that a booking for `range` could be created on the
    /// vehicle right now. Re-validated at approval time; two overlapping
    /// pending requests may both pass here.
    pub async fn check_creatable(
        &self,
        vehicle_id: &Uuid,
        range: &DateRange,
    ) -> Result<(), BookingError> {
        let window = self.vehicle_window(vehicle_id).await?;

        if !window.contains(range) {
            return Err(BookingError::OutOfWindow);
        }

        let approved = self.approved_ranges(vehicle_id, None).await?;
        if find_conflict(range, &approved).is_some() {
            return Err(BookingError::Overlap);
        }

        Ok(())
    }

    /// Final gate before a pending booking transitions to approved: no
    /// *other* approved booking on the same vehicle may overlap its range.
    pub async fn check_approvable(&self, booking: &Booking) -> Result<(), BookingError> {
        let approved = self
            .approved_ranges(&booking.vehicle_id, Some(&booking.id))
            .await?;

        if find_conflict(&booking.range(), &approved).is_some() {
            return Err(BookingError::Overlap);
        }

        Ok(())
    }

    /// Read projection for calendar rendering: the vehicle's window plus
    /// every booking's range and status.
    pub async fn vehicle_calendar(&self, vehicle_id: &Uuid) -> Result<VehicleCalendar, BookingError> {
        let availability = self.vehicle_window(vehicle_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT start_date, end_date, status
            FROM bookings
            WHERE vehicle_id = $1
            ORDER BY start_date
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.get("status");
            let status = BookingStatus::parse(&status)
                .ok_or_else(|| BookingError::DataFormat(format!("unknown status: {}", status)))?;

            bookings.push(CalendarEntry {
                start_date: row.get("start_date"),
                end_date: row.get("end_date"),
                status,
            });
        }

        Ok(VehicleCalendar {
            availability,
            bookings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_no_conflict_against_empty_set() {
        let candidate = range((2024, 6, 5), (2024, 6, 10));
        assert_eq!(find_conflict(&candidate, &[]), None);
    }

    #[test]
    fn test_conflict_is_order_independent() {
        // A requests 06-05..06-10, B requests 06-08..06-15.
        let a = range((2024, 6, 5), (2024, 6, 10));
        let b = range((2024, 6, 8), (2024, 6, 15));

        // Whichever is approved first, the other must conflict.
        assert!(find_conflict(&b, &[a]).is_some());
        assert!(find_conflict(&a, &[b]).is_some());
    }

    #[test]
    fn test_disjoint_ranges_can_both_hold() {
        let a = range((2024, 6, 5), (2024, 6, 10));
        let c = range((2024, 6, 11), (2024, 6, 15));

        assert_eq!(find_conflict(&c, &[a]), None);
        assert_eq!(find_conflict(&a, &[c]), None);
    }

    #[test]
    fn test_conflict_reports_first_overlapping_index() {
        let taken = [
            range((2024, 6, 1), (2024, 6, 3)),
            range((2024, 6, 20), (2024, 6, 25)),
        ];
        let candidate = range((2024, 6, 24), (2024, 6, 28));

        assert_eq!(find_conflict(&candidate, &taken), Some(1));
    }

    #[test]
    fn test_single_day_candidate_conflicts() {
        let taken = [range((2024, 6, 5), (2024, 6, 10))];
        let candidate = range((2024, 6, 10), (2024, 6, 10));

        assert!(find_conflict(&candidate, &taken).is_some());
    }
}
