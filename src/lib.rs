//! Barbearia - appointment booking for a barbershop
//!
//! Customers register, log in, and book appointments through server-rendered
//! pages. Accounts, sessions, and appointments live in SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod views;
