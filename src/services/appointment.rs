//! Appointment service
//!
//! One booking operation backs both booking forms; the payment method is
//! simply optional. Date, time and service are stored as submitted: there
//! is no format validation and no check for an already taken slot.

use crate::db::repositories::AppointmentRepository;
use crate::models::{Appointment, NewAppointment};
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct AppointmentService {
    repo: Arc<dyn AppointmentRepository>,
}

impl AppointmentService {
    pub fn new(repo: Arc<dyn AppointmentRepository>) -> Self {
        Self { repo }
    }

    /// Book an appointment for a customer
    pub async fn book(&self, customer_id: i64, input: NewAppointment) -> Result<Appointment> {
        let appointment = self
            .repo
            .create(customer_id, &input)
            .await
            .context("Failed to book appointment")?;

        tracing::info!(
            appointment_id = appointment.id,
            customer_id,
            date = %appointment.date,
            time = %appointment.time,
            with_payment = appointment.payment.is_some(),
            "Appointment booked"
        );

        Ok(appointment)
    }
}
