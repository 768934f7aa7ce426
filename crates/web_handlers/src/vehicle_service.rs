use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use booking_engine::{AvailabilityLedger, DateRange};

use crate::vehicle_types::*;

/// True when at least one day of the window is not claimed by an approved
/// booking. A vehicle with no free day left is fully booked and dropped
/// from the public listing.
pub fn has_free_day(window: &DateRange, approved: &[DateRange]) -> bool {
    let occupied: HashSet<NaiveDate> = approved.iter().flat_map(|range| range.days()).collect();

    window.days().any(|day| !occupied.contains(&day))
}

/// Service for handling vehicle listing operations
pub struct VehicleService {
    pool: PgPool,
    ledger: AvailabilityLedger,
}

impl VehicleService {
    /// Creates a new instance of `VehicleService` with the provided
    /// database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: AvailabilityLedger::new(pool.clone()),
            pool,
        }
    }

    /// Creates a vehicle listing for the owner. The image has already been
    /// stored; only its URL is persisted.
    pub async fn create_vehicle(
        &self,
        owner_id: &Uuid,
        location: &str,
        window: &DateRange,
        image_url: &str,
    ) -> Result<Vehicle, VehicleError> {
        let row = sqlx::query(
            r#"
            INSERT INTO vehicles (
                owner_id, image_url, location, availability_start, availability_end
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, image_url, location,
                      availability_start, availability_end, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(image_url)
        .bind(location.trim())
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle_from_row(&row))
    }

    /// Gets a vehicle by id.
    pub async fn get_vehicle(&self, vehicle_id: &Uuid) -> Result<Vehicle, VehicleError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, image_url, location,
                   availability_start, availability_end, created_at, updated_at
            FROM vehicles
            WHERE id = $1
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(vehicle_from_row(&row)),
            None => Err(VehicleError::NotFound),
        }
    }

    /// Gets all vehicles listed by an owner, newest first.
    pub async fn vehicles_for_owner(&self, owner_id: &Uuid) -> Result<Vec<Vehicle>, VehicleError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, image_url, location,
                   availability_start, availability_end, created_at, updated_at
            FROM vehicles
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(vehicle_from_row).collect())
    }

    /// Public listing: vehicles whose window covers today and which still
    /// have at least one day free of approved bookings.
    pub async fn available_vehicles(&self) -> Result<Vec<Vehicle>, VehicleError> {
        let today = Utc::now().date_naive();

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, image_url, location,
                   availability_start, availability_end, created_at, updated_at
            FROM vehicles
            WHERE availability_start <= $1 AND availability_end >= $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        let mut available = Vec::new();
        for row in rows {
            let vehicle = vehicle_from_row(&row);
            let window = DateRange {
                start: vehicle.availability.start_date,
                end: vehicle.availability.end_date,
            };

            let approved = self
                .ledger
                .approved_ranges(&vehicle.id, None)
                .await
                .map_err(|e| VehicleError::Availability(e.to_string()))?;

            if has_free_day(&window, &approved) {
                available.push(vehicle);
            }
        }

        Ok(available)
    }

    /// Updates a vehicle listing. Only the owner may update; absent fields
    /// keep their current values.
    pub async fn update_vehicle(
        &self,
        owner_id: &Uuid,
        vehicle_id: &Uuid,
        location: Option<&str>,
        window: Option<&DateRange>,
        image_url: Option<&str>,
    ) -> Result<Vehicle, VehicleError> {
        let current = self.get_vehicle(vehicle_id).await?;
        if current.owner_id != *owner_id {
            return Err(VehicleError::Forbidden);
        }

        let location = location.map(str::trim).unwrap_or(&current.location);
        let (start, end) = match window {
            Some(window) => (window.start, window.end),
            None => (
                current.availability.start_date,
                current.availability.end_date,
            ),
        };
        let image_url = image_url.unwrap_or(&current.image_url);

        let row = sqlx::query(
            r#"
            UPDATE vehicles
            SET location = $1,
                availability_start = $2,
                availability_end = $3,
                image_url = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, owner_id, image_url, location,
                      availability_start, availability_end, created_at, updated_at
            "#,
        )
        .bind(location)
        .bind(start)
        .bind(end)
        .bind(image_url)
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle_from_row(&row))
    }

    /// Deletes a vehicle listing. Only the owner may delete.
    pub async fn delete_vehicle(
        &self,
        owner_id: &Uuid,
        vehicle_id: &Uuid,
    ) -> Result<(), VehicleError> {
        let current = self.get_vehicle(vehicle_id).await?;
        if current.owner_id != *owner_id {
            return Err(VehicleError::Forbidden);
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn vehicle_from_row(row: &PgRow) -> Vehicle {
    Vehicle {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        image_url: row.get("image_url"),
        location: row.get("location"),
        availability: AvailabilityWindow {
            start_date: row.get("availability_start"),
            end_date: row.get("availability_end"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_unbooked_window_has_free_days() {
        let window = range((2024, 6, 1), (2024, 6, 30));
        assert!(has_free_day(&window, &[]));
    }

    #[test]
    fn test_partially_booked_window_has_free_days() {
        let window = range((2024, 6, 1), (2024, 6, 30));
        let approved = [range((2024, 6, 5), (2024, 6, 10))];

        assert!(has_free_day(&window, &approved));
    }

    #[test]
    fn test_fully_booked_window_has_no_free_days() {
        let window = range((2024, 6, 1), (2024, 6, 10));
        let approved = [
            range((2024, 6, 1), (2024, 6, 4)),
            range((2024, 6, 5), (2024, 6, 10)),
        ];

        assert!(!has_free_day(&window, &approved));
    }

    #[test]
    fn test_bookings_outside_window_do_not_count() {
        let window = range((2024, 6, 1), (2024, 6, 1));
        let approved = [range((2024, 5, 1), (2024, 5, 31))];

        assert!(has_free_day(&window, &approved));
    }
}
