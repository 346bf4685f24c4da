//! Customer repository
//!
//! Database operations for customers.
//!
//! Email uniqueness is enforced by the `customers.email` UNIQUE constraint;
//! a rejected insert surfaces as [`EmailTaken`] and leaves existing rows
//! untouched.

use crate::models::Customer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Insert rejected because the email is already registered
#[derive(Debug, thiserror::Error)]
#[error("Email '{0}' is already registered")]
pub struct EmailTaken(pub String);

/// Customer repository trait
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer.
    ///
    /// Fails with an [`EmailTaken`] error (downcastable from the returned
    /// `anyhow::Error`) when the email already exists.
    async fn create(&self, customer: &Customer) -> Result<Customer>;

    /// Get customer by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Customer>>;

    /// Get customer by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>>;

    /// Count customers registered with an email (0 or 1)
    async fn count_by_email(&self, email: &str) -> Result<i64>;
}

/// SQLx-based customer repository
pub struct SqlxCustomerRepository {
    pool: SqlitePool,
}

impl SqlxCustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CustomerRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CustomerRepository for SqlxCustomerRepository {
    async fn create(&self, customer: &Customer) -> Result<Customer> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(EmailTaken(customer.email.clone()).into());
            }
            Err(e) => return Err(e).context("Failed to create customer"),
        };

        Ok(Customer {
            id: result.last_insert_rowid(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            password_hash: customer.password_hash.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM customers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get customer by ID")?;

        Ok(row.as_ref().map(row_to_customer))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM customers
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get customer by email")?;

        Ok(row.as_ref().map(row_to_customer))
    }

    async fn count_by_email(&self, email: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count customers")?;

        Ok(count)
    }
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxCustomerRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxCustomerRepository::new(pool)
    }

    fn test_customer(name: &str, email: &str) -> Customer {
        Customer::new(name.to_string(), email.to_string(), "$argon2id$hash".to_string())
    }

    #[tokio::test]
    async fn test_create_customer() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&test_customer("Carlos", "carlos@example.com"))
            .await
            .expect("Failed to create customer");

        assert!(created.id > 0);
        assert_eq!(created.name, "Carlos");
        assert_eq!(created.email, "carlos@example.com");
    }

    #[tokio::test]
    async fn test_get_by_id_and_email() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_customer("Carlos", "carlos@example.com"))
            .await
            .expect("Failed to create customer");

        let by_id = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get customer")
            .expect("Customer not found");
        assert_eq!(by_id.email, "carlos@example.com");

        let by_email = repo
            .get_by_email("carlos@example.com")
            .await
            .expect("Failed to get customer")
            .expect("Customer not found");
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.password_hash, "$argon2id$hash");
    }

    #[tokio::test]
    async fn test_get_missing_customer() {
        let repo = setup_test_repo().await;

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_email_taken() {
        let repo = setup_test_repo().await;
        repo.create(&test_customer("Primeiro", "dup@example.com"))
            .await
            .expect("Failed to create first customer");

        let err = repo
            .create(&test_customer("Segundo", "dup@example.com"))
            .await
            .expect_err("Duplicate email should fail");

        assert!(err.downcast_ref::<EmailTaken>().is_some());
        assert_eq!(repo.count_by_email("dup@example.com").await.unwrap(), 1);

        let kept = repo
            .get_by_email("dup@example.com")
            .await
            .unwrap()
            .expect("First row should remain");
        assert_eq!(kept.name, "Primeiro");
    }
}
