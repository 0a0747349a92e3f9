use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InterviewMode {
    Online,
    InPerson,
}

impl InterviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::Online => "online",
            InterviewMode::InPerson => "in_person",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InterviewStatus {
    /// Invite sent; waiting for the candidate to pick a slot.
    AwaitingCandidate,
    PendingEmpApproval,
    /// Candidate picked a slot; waiting for the interviewer to confirm.
    AwaitingEmpConfirm,
    Confirmed,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewStatus::Completed | InterviewStatus::Cancelled)
    }
}

/// One scheduled meeting for one application. A re-scheduled interview is a
/// new row; `start_at`/`end_at` are copied from the booked slot and never
/// change afterwards. Meeting identifiers are populated exactly once, when
/// the status moves to `confirmed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: i64,
    pub application_id: i64,
    pub mode: InterviewMode,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: InterviewStatus,
    pub location_text: String,
    pub meeting_id: String,
    pub join_url: String,
    pub host_url: String,
    pub invite_sent_at: Option<DateTime<Utc>>,
    pub reminder_48h_sent: bool,
    pub reminder_24h_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who interviews. One row per (interview, employee); panels carry several.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewerAssignment {
    pub id: i64,
    pub interview_id: i64,
    pub employee_id: i64,
    pub role: String,
}
