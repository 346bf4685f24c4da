//! Customer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered customer.
///
/// The email address is the login key and is unique across all customers.
/// Customers are created at registration and never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2, PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new, not yet persisted customer.
    ///
    /// The password must already be hashed with
    /// `services::password::hash_password()`.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
