//! Booking pages
//!
//! Routes (session required):
//! - GET  /agendar    - quick booking form
//! - POST /agendar    - book without a payment method
//! - GET  /finalizar  - checkout form, `?servico=` prefills the service
//! - POST /finalizar  - book with a payment method
//!
//! Submitted values are stored verbatim. Booking a slot that is already
//! taken is allowed.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::api::middleware::{AppState, AuthenticatedCustomer, WebError};
use crate::models::NewAppointment;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agendar", get(quick_booking_page).post(quick_booking))
        .route("/finalizar", get(checkout_page).post(checkout))
}

#[derive(Debug, Deserialize)]
pub struct QuickBookingForm {
    pub data: String,
    pub horario: String,
    pub servico: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub servico: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(rename = "data-agendamento")]
    pub date: String,
    #[serde(rename = "hora-agendamento")]
    pub time: String,
    #[serde(rename = "tipo-pagamento")]
    pub payment: String,
    #[serde(rename = "servico-nome")]
    pub service: String,
}

/// GET /agendar
async fn quick_booking_page(
    State(state): State<AppState>,
    _customer: AuthenticatedCustomer,
) -> Result<Html<String>, WebError> {
    let html = state.views.render("agendar.html", &tera::Context::new())?;
    Ok(Html(html))
}

/// POST /agendar
async fn quick_booking(
    State(state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Form(form): Form<QuickBookingForm>,
) -> Result<&'static str, WebError> {
    state
        .appointment_service
        .book(
            customer.id,
            NewAppointment::new(form.data, form.horario, form.servico),
        )
        .await?;

    Ok("Agendamento realizado com sucesso!")
}

/// GET /finalizar
async fn checkout_page(
    State(state): State<AppState>,
    _customer: AuthenticatedCustomer,
    Query(query): Query<CheckoutQuery>,
) -> Result<Html<String>, WebError> {
    let mut context = tera::Context::new();
    context.insert("servico_url", &query.servico.unwrap_or_default());

    let html = state.views.render("finalizar.html", &context)?;
    Ok(Html(html))
}

/// POST /finalizar
///
/// A storage failure is reported to the customer with its cause.
async fn checkout(
    State(state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect, WebError> {
    let appointment = NewAppointment::new(form.date, form.time, form.service)
        .with_payment(form.payment);

    state
        .appointment_service
        .book(customer.id, appointment)
        .await
        .map_err(|e| {
            tracing::error!(customer_id = customer.id, "Checkout booking failed: {:#}", e);
            WebError::BookingFailed(format!("{:#}", e))
        })?;

    Ok(Redirect::to("/cliente"))
}
