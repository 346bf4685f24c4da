//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - Customer registration, login, logout and session validation
//! - Appointment booking
//! - Password hashing

pub mod appointment;
pub mod customer;
pub mod password;

pub use appointment::AppointmentService;
pub use customer::{CustomerService, CustomerServiceError, LoginInput, RegisterInput};
pub use password::{hash_password, verify_password};
