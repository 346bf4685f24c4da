//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the statements for a single table.

pub mod appointment;
pub mod customer;
pub mod session;

pub use appointment::{AppointmentRepository, SqlxAppointmentRepository};
pub use customer::{CustomerRepository, EmailTaken, SqlxCustomerRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
