//! Database layer
//!
//! SQLite storage for customers, appointments, and sessions. The pool is
//! created from configuration and shared by every repository.
//!
//! ```ignore
//! use barbearia::config::DatabaseConfig;
//! use barbearia::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, ping};
