//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side session binding a browser cookie to one customer.
///
/// The customer's display name is captured at login so views can greet the
/// customer without reading the customers table again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (cookie token)
    pub id: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Identity carried by this session
    pub fn customer(&self) -> SessionCustomer {
        SessionCustomer {
            id: self.customer_id,
            name: self.customer_name.clone(),
        }
    }
}

/// The authenticated identity a session resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCustomer {
    pub id: i64,
    pub name: String,
}
