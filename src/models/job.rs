use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Read model of a job posting. Content management lives outside the core;
/// scoring and scheduling only read these fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub company_name: String,
    pub title: String,
    pub required_qualifications: Json<Vec<String>>,
    pub tools: Json<Vec<String>>,
    pub visa_sponsorship: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssigneeStatus {
    Invited,
    Accepted,
    Declined,
}

/// Employee assigned to handle a job's applications and interviews. Only
/// `accepted` assignees get review queues and offer interview slots.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobAssignee {
    pub id: i64,
    pub job_id: i64,
    pub employee_id: i64,
    pub status: AssigneeStatus,
}
