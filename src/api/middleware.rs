//! Shared request plumbing
//!
//! Contains:
//! - `AppState`, the services every handler can reach
//! - `WebError`, the single error type handlers return
//! - Session cookie parsing and the session-loading middleware
//! - The `AuthenticatedCustomer` / `CurrentCustomer` extractors

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::SessionConfig;
use crate::db::repositories::{
    SqlxAppointmentRepository, SqlxCustomerRepository, SqlxSessionRepository,
};
use crate::models::SessionCustomer;
use crate::services::{AppointmentService, CustomerService, CustomerServiceError};
use crate::views::ViewEngine;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub customer_service: Arc<CustomerService>,
    pub appointment_service: Arc<AppointmentService>,
    pub views: Arc<ViewEngine>,
    pub session_config: Arc<SessionConfig>,
}

impl AppState {
    /// Wire the services on top of a migrated pool
    pub fn new(pool: SqlitePool, views: ViewEngine, session_config: SessionConfig) -> Self {
        let customer_service = CustomerService::new(
            SqlxCustomerRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            session_config.ttl(),
        );
        let appointment_service = AppointmentService::new(SqlxAppointmentRepository::boxed(pool));

        Self {
            customer_service: Arc::new(customer_service),
            appointment_service: Arc::new(appointment_service),
            views: Arc::new(views),
            session_config: Arc::new(session_config),
        }
    }
}

/// Errors surfaced to the browser
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No valid session; the browser is sent to the login page
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Storage failure while booking; the cause is echoed to the user
    #[error("Booking failed: {0}")]
    BookingFailed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<CustomerServiceError> for WebError {
    fn from(e: CustomerServiceError) -> Self {
        match e {
            CustomerServiceError::EmailTaken(_) => WebError::EmailTaken,
            CustomerServiceError::InvalidCredentials => WebError::InvalidCredentials,
            CustomerServiceError::Internal(e) => WebError::Internal(e),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Unauthenticated => Redirect::to("/login").into_response(),
            WebError::EmailTaken => (StatusCode::CONFLICT, "Email já cadastrado!").into_response(),
            WebError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Email ou senha incorretos!").into_response()
            }
            WebError::BookingFailed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Erro ao agendar: {}", message),
            )
                .into_response(),
            WebError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor").into_response()
            }
        }
    }
}

/// Extract the session token from the `Cookie` header
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()))
        .filter(|token| !token.is_empty())
        .map(String::from)
}

/// `Set-Cookie` value carrying a new session token
pub fn session_cookie(config: &SessionConfig, token: &str) -> Result<HeaderValue, WebError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name,
        token,
        config.max_age_seconds()
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| WebError::Internal(anyhow::anyhow!("Invalid session cookie: {}", e)))
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderValue, WebError> {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    );

    HeaderValue::from_str(&cookie)
        .map_err(|e| WebError::Internal(anyhow::anyhow!("Invalid session cookie: {}", e)))
}

/// Session-loading middleware.
///
/// Resolves the session cookie, if any, and stores the customer in the
/// request extensions. Never rejects: handlers decide whether a session is
/// required through their extractors.
pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(request.headers(), &state.session_config.cookie_name)
    {
        match state.customer_service.validate_session(&token).await {
            Ok(Some(customer)) => {
                request
                    .extensions_mut()
                    .insert(AuthenticatedCustomer(customer));
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired session"),
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }

    next.run(request).await
}

/// Logged-in customer; requests without a session are redirected to `/login`
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer(pub SessionCustomer);

impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedCustomer>()
            .cloned()
            .ok_or(WebError::Unauthenticated)
    }
}

/// Logged-in customer, if there is one
#[derive(Debug, Clone)]
pub struct CurrentCustomer(pub Option<SessionCustomer>);

impl<S> FromRequestParts<S> for CurrentCustomer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentCustomer(
            parts
                .extensions
                .get::<AuthenticatedCustomer>()
                .map(|c| c.0.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_session_token() {
        let headers = cookie_headers("theme=dark; session=abc-123; lang=pt");
        assert_eq!(
            extract_session_token(&headers, "session"),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_missing_or_empty() {
        assert_eq!(extract_session_token(&HeaderMap::new(), "session"), None);
        assert_eq!(
            extract_session_token(&cookie_headers("session="), "session"),
            None
        );
        assert_eq!(
            extract_session_token(&cookie_headers("session_old=abc"), "session"),
            None
        );
    }

    #[test]
    fn test_extract_session_token_custom_name() {
        let headers = cookie_headers("session=wrong; barbearia_sid=right");
        assert_eq!(
            extract_session_token(&headers, "barbearia_sid"),
            Some("right".to_string())
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = SessionConfig::default();
        let cookie = session_cookie(&config, "tok").unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_flag() {
        let config = SessionConfig {
            secure_cookie: true,
            ..SessionConfig::default()
        };
        let cookie = session_cookie(&config, "tok").unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&SessionConfig::default()).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_web_error_statuses() {
        assert_eq!(
            WebError::Unauthenticated.into_response().status(),
            StatusCode::SEE_OTHER
        );
        assert_eq!(
            WebError::EmailTaken.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WebError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebError::BookingFailed("disk full".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    proptest! {
        #[test]
        fn prop_token_found_among_other_cookies(
            token in "[a-f0-9-]{1,40}",
            before in proptest::collection::vec("[a-z]{1,8}=[a-z0-9]{0,8}", 0..4),
            after in proptest::collection::vec("[a-z]{1,8}=[a-z0-9]{0,8}", 0..4),
        ) {
            let before: Vec<_> = before.into_iter().filter(|c| !c.starts_with("session=")).collect();
            let mut cookies = before;
            cookies.push(format!("session={}", token));
            cookies.extend(after);

            let headers = cookie_headers(&cookies.join("; "));
            prop_assert_eq!(extract_session_token(&headers, "session"), Some(token));
        }
    }
}
