use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A fixed-duration time interval offered by one employee. `is_bookable`
/// flips true→false exactly once, atomically with interview creation, and
/// never reverts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AvailabilitySlot {
    pub id: i64,
    pub employee_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_bookable: bool,
    pub created_at: DateTime<Utc>,
}
