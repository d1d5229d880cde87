use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tripway_core::booking::{Booking, BookingPatch, BookingStatus, NewBooking};
use tripway_core::repository::BookingRepository;
use tripway_core::{CoreError, CoreResult};

use crate::database::{internal, map_db_error};

pub struct MySqlBookingRepository {
    pool: MySqlPool,
}

impl MySqlBookingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: u64,
    booking_id: String,
    user_id: u64,
    booking_type: String,
    package_id: Option<u64>,
    hotel_id: Option<u64>,
    flight_number: Option<String>,
    travel_date: NaiveDate,
    return_date: Option<NaiveDate>,
    adults: u32,
    children: u32,
    total_price: f64,
    status: String,
    payment_status: String,
    contact_email: Option<String>,
    special_requests: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            booking_id: row.booking_id,
            user_id: row.user_id,
            booking_type: row.booking_type.parse()?,
            package_id: row.package_id,
            hotel_id: row.hotel_id,
            flight_number: row.flight_number,
            travel_date: row.travel_date,
            return_date: row.return_date,
            adults: row.adults,
            children: row.children,
            total_price: row.total_price,
            status: row.status.parse()?,
            payment_status: row.payment_status.parse()?,
            contact_email: row.contact_email,
            special_requests: row.special_requests,
            created_at: row.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, booking_id, user_id, booking_type, package_id, hotel_id, flight_number, \
     travel_date, return_date, adults, children, total_price, status, payment_status, \
     contact_email, special_requests, created_at";

/// `UPDATE` touching only the columns present in `patch`.
fn update_query(booking_id: &str, patch: BookingPatch) -> QueryBuilder<'_, MySql> {
    let mut qb: QueryBuilder<MySql> = QueryBuilder::new("UPDATE bookings SET ");
    {
        let mut columns = qb.separated(", ");
        if let Some(status) = patch.status {
            columns.push("status = ");
            columns.push_bind_unseparated(status.as_str());
        }
        if let Some(payment_status) = patch.payment_status {
            columns.push("payment_status = ");
            columns.push_bind_unseparated(payment_status.as_str());
        }
    }
    qb.push(" WHERE booking_id = ");
    qb.push_bind(booking_id);
    qb
}

fn into_bookings(rows: Vec<BookingRow>) -> CoreResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

impl MySqlBookingRepository {
    async fn fetch_one<'e, E>(executor: E, booking_id: &str) -> CoreResult<Option<Booking>>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE booking_id = ?",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(executor)
        .await
        .map_err(internal)?;

        row.map(Booking::try_from).transpose()
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn create_booking(&self, booking: NewBooking) -> CoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // Lock the owning user row so concurrent submissions for one account serialize.
        let user_exists = sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE id = ? FOR UPDATE")
            .bind(booking.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(internal)?;
        if user_exists.is_none() {
            return Err(CoreError::NotFound(format!("User {}", booking.user_id)));
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (booking_id, user_id, booking_type, package_id, hotel_id, flight_number,
                                  travel_date, return_date, adults, children, total_price, status,
                                  payment_status, contact_email, special_requests)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&booking.booking_id)
        .bind(booking.user_id)
        .bind(booking.booking_type.as_str())
        .bind(booking.package_id)
        .bind(booking.hotel_id)
        .bind(&booking.flight_number)
        .bind(booking.travel_date)
        .bind(booking.return_date)
        .bind(booking.adults)
        .bind(booking.children)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(&booking.contact_email)
        .bind(&booking.special_requests)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error(&format!("Booking {}", booking.booking_id), e))?;

        let created = Self::fetch_one(&mut *tx, &booking.booking_id)
            .await?
            .ok_or_else(|| CoreError::Internal("booking vanished after insert".to_string()))?;

        tx.commit().await.map_err(internal)?;
        Ok(created)
    }

    async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        into_bookings(rows)
    }

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>> {
        Self::fetch_one(&self.pool, booking_id).await
    }

    async fn list_user_bookings(&self, user_id: u64) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        into_bookings(rows)
    }

    async fn update_booking(&self, booking_id: &str, patch: BookingPatch) -> CoreResult<Booking> {
        if patch.is_empty() {
            return Err(CoreError::Validation("nothing to update".to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(internal)?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM bookings WHERE booking_id = ? FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?
        .ok_or_else(|| CoreError::NotFound(format!("Booking {}", booking_id)))?;

        let current: BookingStatus = current.parse()?;
        patch.check_against(current)?;

        update_query(booking_id, patch)
            .build().execute(&mut *tx).await.map_err(internal)?;

        let updated = Self::fetch_one(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {}", booking_id)))?;

        tx.commit().await.map_err(internal)?;
        Ok(updated)
    }

    async fn delete_booking(&self, booking_id: &str) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE booking_id = ?")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;

        Ok(result.rows_affected() > 0)
    }
}
