//! Registration and login pages
//!
//! Routes:
//! - GET  /          - login page, or the customer area when logged in
//! - GET  /cadastro  - registration form
//! - POST /cadastro  - create an account
//! - GET  /login     - login form
//! - POST /login     - start a session
//! - GET  /logout    - end the session

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::api::middleware::{
    clear_session_cookie, extract_session_token, session_cookie, AppState, CurrentCustomer,
    WebError,
};
use crate::services::{LoginInput, RegisterInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/cadastro", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub nome: String,
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub senha: String,
}

/// GET /
async fn home(
    State(state): State<AppState>,
    CurrentCustomer(customer): CurrentCustomer,
) -> Result<Response, WebError> {
    if customer.is_some() {
        return Ok(Redirect::to("/cliente").into_response());
    }

    Ok(render_page(&state, "login.html")?.into_response())
}

/// GET /cadastro
async fn register_page(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    render_page(&state, "cadastro.html")
}

/// POST /cadastro
async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, WebError> {
    state
        .customer_service
        .register(RegisterInput::new(form.nome, form.email, form.senha))
        .await?;

    Ok(Redirect::to("/"))
}

/// GET /login
async fn login_page(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    render_page(&state, "login.html")
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, WebError> {
    let session = state
        .customer_service
        .login(LoginInput::new(form.email, form.senha))
        .await?;

    let cookie = session_cookie(&state.session_config, &session.id)?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/cliente")))
}

/// GET /logout
///
/// Always clears the cookie, even when there was no session to end.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, WebError> {
    if let Some(token) = extract_session_token(&headers, &state.session_config.cookie_name) {
        if let Err(e) = state.customer_service.logout(&token).await {
            tracing::warn!("Failed to end session: {}", e);
        }
    }

    let cookie = clear_session_cookie(&state.session_config)?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")))
}

fn render_page(state: &AppState, template: &str) -> Result<Html<String>, WebError> {
    let html = state.views.render(template, &tera::Context::new())?;
    Ok(Html(html))
}
