//! Data models
//!
//! Entities persisted by the booking application and the inputs that
//! create them.

mod appointment;
mod customer;
mod session;

pub use appointment::{Appointment, NewAppointment};
pub use customer::Customer;
pub use session::{Session, SessionCustomer};
