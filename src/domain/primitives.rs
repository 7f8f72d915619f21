//! Domain primitives: CustomerId, OrderId and timestamp helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer identifier (primary key of the customers table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub i64);

impl CustomerId {
    /// Create a CustomerId from its raw value.
    pub fn new(id: i64) -> Self {
        CustomerId(id)
    }

    /// Get the underlying identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order identifier (primary key of the orders table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl OrderId {
    /// Create an OrderId from its raw value.
    pub fn new(id: i64) -> Self {
        OrderId(id)
    }

    /// Get the underlying identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert milliseconds since the Unix epoch into a UTC timestamp.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn datetime_from_ms(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}
