//! Appointment repository
//!
//! Database operations for appointments. Inserts are single statements with
//! no slot conflict check.

use crate::models::{Appointment, NewAppointment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Appointment repository trait
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Insert an appointment for a customer
    async fn create(&self, customer_id: i64, input: &NewAppointment) -> Result<Appointment>;

    /// Get appointment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Appointment>>;

    /// List a customer's appointments, oldest first
    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Appointment>>;

    /// Count appointments booked for a date/time slot
    async fn count_by_slot(&self, date: &str, time: &str) -> Result<i64>;
}

/// SQLx-based appointment repository
pub struct SqlxAppointmentRepository {
    pool: SqlitePool,
}

impl SqlxAppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn AppointmentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AppointmentRepository for SqlxAppointmentRepository {
    async fn create(&self, customer_id: i64, input: &NewAppointment) -> Result<Appointment> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO appointments (customer_id, date, time, service, payment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer_id)
        .bind(&input.date)
        .bind(&input.time)
        .bind(&input.service)
        .bind(input.payment.as_deref())
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create appointment")?;

        Ok(Appointment {
            id: result.last_insert_rowid(),
            customer_id,
            date: input.date.clone(),
            time: input.time.clone(),
            service: input.service.clone(),
            payment: input.payment.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, date, time, service, payment, created_at
            FROM appointments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get appointment by ID")?;

        Ok(row.as_ref().map(row_to_appointment))
    }

    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Appointment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, date, time, service, payment, created_at
            FROM appointments
            WHERE customer_id = ?
            ORDER BY id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list appointments")?;

        Ok(rows.iter().map(row_to_appointment).collect())
    }

    async fn count_by_slot(&self, date: &str, time: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE date = ? AND time = ?")
                .bind(date)
                .bind(time)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count appointments")?;

        Ok(count)
    }
}

fn row_to_appointment(row: &sqlx::sqlite::SqliteRow) -> Appointment {
    Appointment {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        date: row.get("date"),
        time: row.get("time"),
        service: row.get("service"),
        payment: row.get("payment"),
        created_at: row.get("created_at"),
    }
}
