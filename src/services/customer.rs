//! Customer service
//!
//! Registration, login/logout and server-side session handling.
//!
//! A session is created only after the email lookup and the password hash
//! check both succeed. The session snapshots the customer's display name so
//! request handlers never need a second lookup.

use crate::db::repositories::{CustomerRepository, EmailTaken, SessionRepository};
use crate::models::{Customer, Session, SessionCustomer};
use crate::services::password::{hash_password, verify_password};
use anyhow::{anyhow, Context};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Error types for customer service operations
#[derive(Debug, thiserror::Error)]
pub enum CustomerServiceError {
    /// The email is already registered
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Storage or hashing failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Customer service for registration and authentication
pub struct CustomerService {
    customer_repo: Arc<dyn CustomerRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_ttl: Duration,
}

impl CustomerService {
    /// Create a customer service issuing sessions that live for `session_ttl`
    pub fn new(
        customer_repo: Arc<dyn CustomerRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            customer_repo,
            session_repo,
            session_ttl,
        }
    }

    /// Register a new customer.
    ///
    /// The password is hashed before storage. Email uniqueness is left to
    /// the storage constraint, so concurrent registrations with the same
    /// email cannot both succeed.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if the email is already registered
    /// - `Internal` for hashing or database errors
    pub async fn register(&self, input: RegisterInput) -> Result<Customer, CustomerServiceError> {
        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let customer = Customer::new(input.name, input.email, password_hash);

        match self.customer_repo.create(&customer).await {
            Ok(created) => {
                tracing::info!(customer_id = created.id, "Customer registered");
                Ok(created)
            }
            Err(e) => match e.downcast::<EmailTaken>() {
                Ok(EmailTaken(email)) => {
                    tracing::info!("Registration rejected: email already registered");
                    Err(CustomerServiceError::EmailTaken(email))
                }
                Err(e) => Err(CustomerServiceError::Internal(e)),
            },
        }
    }

    /// Login with email and password.
    ///
    /// On success a new server-side session is stored and returned; its `id`
    /// is the token to hand to the browser.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown email or a wrong password
    /// - `Internal` for database errors
    pub async fn login(&self, input: LoginInput) -> Result<Session, CustomerServiceError> {
        let customer = self
            .customer_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to look up customer")?;

        let customer = match customer {
            Some(customer) => customer,
            None => {
                tracing::info!("Login failed: unknown email");
                return Err(CustomerServiceError::InvalidCredentials);
            }
        };

        let password_valid = verify_password(&input.password, &customer.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            tracing::info!(customer_id = customer.id, "Login failed: wrong password");
            return Err(CustomerServiceError::InvalidCredentials);
        }

        let session = self.create_session(&customer).await?;
        tracing::info!(customer_id = customer.id, "Customer logged in");

        Ok(session)
    }

    /// Logout (invalidate session). Unknown tokens are not an error.
    pub async fn logout(&self, token: &str) -> Result<(), CustomerServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;

        tracing::debug!("Session closed");
        Ok(())
    }

    /// Resolve a session token to the customer it belongs to.
    ///
    /// Returns `None` for unknown or expired tokens; expired sessions are
    /// removed on the way.
    pub async fn validate_session(
        &self,
        token: &str,
    ) -> Result<Option<SessionCustomer>, CustomerServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to remove expired session: {}", e);
            }
            return Ok(None);
        }

        Ok(Some(session.customer()))
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, CustomerServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }

    async fn create_session(&self, customer: &Customer) -> Result<Session, CustomerServiceError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| anyhow!("Session lifetime out of range: {}", self.session_ttl))?;

        let session = Session {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            expires_at,
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }
}

/// Input for customer registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Input for customer login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCustomerRepository, SqlxSessionRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_service_with_ttl(ttl: Duration) -> (sqlx::SqlitePool, CustomerService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = CustomerService::new(
            SqlxCustomerRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            ttl,
        );

        (pool, service)
    }

    async fn setup_test_service() -> (sqlx::SqlitePool, CustomerService) {
        setup_service_with_ttl(Duration::hours(24)).await
    }

    async fn session_count(pool: &sqlx::SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(pool)
            .await
            .expect("Failed to count sessions")
    }

    // ========================================================================
    // Registration
    // ========================================================================

    #[tokio::test]
    async fn test_register_then_login() {
        let (_pool, service) = setup_test_service().await;

        let customer = service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .expect("Failed to register");

        let session = service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .expect("Failed to login");

        assert_eq!(session.customer_id, customer.id);
        assert_eq!(session.customer_name, "Ana");
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let (pool, service) = setup_test_service().await;

        service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .expect("Failed to register");

        let result = service
            .register(RegisterInput::new("Outra Ana", "ana@example.com", "outra"))
            .await;

        assert!(matches!(result, Err(CustomerServiceError::EmailTaken(ref e)) if e == "ana@example.com"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE email = ?")
            .bind("ana@example.com")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);

        // The first registration still works
        service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .expect("First customer should still log in");
    }

    #[tokio::test]
    async fn test_password_is_hashed() {
        let (_pool, service) = setup_test_service().await;

        let customer = service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();

        assert_ne!(customer.password_hash, "segredo");
        assert!(customer.password_hash.starts_with("$argon2id$"));
    }

    // ========================================================================
    // Login
    // ========================================================================

    #[tokio::test]
    async fn test_login_wrong_password_creates_no_session() {
        let (pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();

        let result = service
            .login(LoginInput::new("ana@example.com", "errada"))
            .await;

        assert!(matches!(result, Err(CustomerServiceError::InvalidCredentials)));
        assert_eq!(session_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_login_unknown_email_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service
            .login(LoginInput::new("ninguem@example.com", "segredo"))
            .await;

        assert!(matches!(result, Err(CustomerServiceError::InvalidCredentials)));
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    #[tokio::test]
    async fn test_validate_session() {
        let (_pool, service) = setup_test_service().await;
        let customer = service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();
        let session = service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .unwrap();

        let identity = service
            .validate_session(&session.id)
            .await
            .expect("Failed to validate")
            .expect("Session should be valid");

        assert_eq!(identity.id, customer.id);
        assert_eq!(identity.name, "Ana");
        assert!(service.validate_session("bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let (pool, service) = setup_service_with_ttl(Duration::hours(-1)).await;
        service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();
        let session = service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert_eq!(session_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();
        let session = service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .unwrap();

        service.logout(&session.id).await.expect("Failed to logout");

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        service
            .logout("already-gone")
            .await
            .expect("Unknown token logout should succeed");
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let (_pool, service) = setup_service_with_ttl(Duration::hours(-1)).await;
        service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();
        service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .unwrap();
        service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await
            .unwrap();

        let removed = service.cleanup_expired_sessions().await.expect("Failed to clean up");
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_login_with_unrepresentable_expiry_fails_cleanly() {
        let (pool, service) = setup_service_with_ttl(Duration::MAX).await;
        service
            .register(RegisterInput::new("Ana", "ana@example.com", "segredo"))
            .await
            .unwrap();

        let result = service
            .login(LoginInput::new("ana@example.com", "segredo"))
            .await;

        assert!(matches!(result, Err(CustomerServiceError::Internal(_))));
        assert_eq!(session_count(&pool).await, 0);
    }
}
