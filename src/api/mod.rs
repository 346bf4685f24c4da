//! HTTP layer - handlers and routing
//!
//! Server-rendered pages for the barbershop:
//! - Registration and login (`auth`)
//! - Customer area (`dashboard`)
//! - Booking forms (`booking`)

pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod middleware;


use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use middleware::{AppState, AuthenticatedCustomer, CurrentCustomer, WebError};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(booking::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    middleware::load_session,
                )),
        )
        .with_state(state)
}
