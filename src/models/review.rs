use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Pairing of one application to one reviewing employee. Unique per
/// (application, employee); `decision` is written once and never changed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewAssignment {
    pub id: i64,
    pub application_id: i64,
    pub employee_id: i64,
    pub is_owner: bool,
    pub decision: Option<ReviewDecision>,
    pub decision_notes: String,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Queue row: an undecided assignment joined with the application it points
/// at, ordered oldest application first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueItem {
    pub assignment_id: i64,
    pub application_id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub ats_score: i64,
    pub application_created_at: DateTime<Utc>,
}
