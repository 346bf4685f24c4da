//! Appointment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A booked service, owned by exactly one customer.
///
/// `date`, `time`, `service` and `payment` are free-text labels exactly as
/// submitted. Nothing prevents two appointments for the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub customer_id: i64,
    pub date: String,
    pub time: String,
    pub service: String,
    /// Payment method label; absent for bookings made without one
    pub payment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for booking an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub date: String,
    pub time: String,
    pub service: String,
    pub payment: Option<String>,
}

impl NewAppointment {
    /// Booking without a payment method
    pub fn new(date: impl Into<String>, time: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            service: service.into(),
            payment: None,
        }
    }

    /// Attach a payment method label
    pub fn with_payment(mut self, payment: impl Into<String>) -> Self {
        self.payment = Some(payment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appointment_without_payment() {
        let input = NewAppointment::new("2025-06-01", "10:00", "Corte");
        assert_eq!(input.payment, None);
        assert_eq!(input.service, "Corte");
    }

    #[test]
    fn test_new_appointment_with_payment() {
        let input = NewAppointment::new("2025-06-01", "10:00", "Barba").with_payment("Pix");
        assert_eq!(input.payment.as_deref(), Some("Pix"));
    }
}
