//! Customer area
//!
//! Routes (session required):
//! - GET /dashboard - plain-text greeting
//! - GET /cliente   - dashboard page with booking links

use axum::{extract::State, response::Html, routing::get, Router};

use crate::api::middleware::{AppState, AuthenticatedCustomer, WebError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(greeting))
        .route("/cliente", get(customer_dashboard))
}

/// GET /dashboard
async fn greeting(AuthenticatedCustomer(customer): AuthenticatedCustomer) -> String {
    format!("Olá, {}! Bem-vindo ao painel da barbearia.", customer.name)
}

/// GET /cliente
async fn customer_dashboard(
    State(state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Html<String>, WebError> {
    let mut context = tera::Context::new();
    context.insert("nome", &customer.name);

    let html = state.views.render("cliente_dashboard.html", &context)?;
    Ok(Html(html))
}
