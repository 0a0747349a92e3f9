use crate::error::{Error, Result};
use crate::models::profile::CandidateProfile;
use crate::services::scoring::AtsSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Position of an application in the hiring pipeline. Transitions only move
/// forward along this order, except the reject escape which is reachable
/// from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ApplicationStage {
    Submitted,
    AtsScreen,
    EmployeeReview,
    InterviewPending,
    InterviewScheduled,
    UnderConsideration,
    Offer,
    Hired,
    Rejected,
}

/// Events that may move an application between stages. Every entry point
/// (submission, review decision, booking, manual HR action) goes through
/// `ApplicationStage::transition` with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// ATS score met the threshold at submission time.
    AtsPass,
    /// ATS score fell below the threshold at submission time.
    AtsBelow,
    /// Pulled into a reviewer's queue.
    EnterReviewQueue,
    /// A reviewer approved the application.
    Approve,
    /// A reviewer (or screening) rejected the application.
    Reject,
    /// A slot was booked for the candidate.
    ScheduleInterview,
    /// Manual HR actions past the scheduling core.
    Shortlist,
    ExtendOffer,
    Hire,
}

impl ApplicationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStage::Submitted => "submitted",
            ApplicationStage::AtsScreen => "ats_screen",
            ApplicationStage::EmployeeReview => "employee_review",
            ApplicationStage::InterviewPending => "interview_pending",
            ApplicationStage::InterviewScheduled => "interview_scheduled",
            ApplicationStage::UnderConsideration => "under_consideration",
            ApplicationStage::Offer => "offer",
            ApplicationStage::Hired => "hired",
            ApplicationStage::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStage::Rejected | ApplicationStage::Hired)
    }

    /// The single transition table. Everything not listed here is illegal;
    /// there is no way to skip or reverse a stage.
    pub fn transition(self, event: StageEvent) -> Result<ApplicationStage> {
        use ApplicationStage::*;
        use StageEvent::*;

        let next = match (self, event) {
            (Submitted, AtsPass) => Some(EmployeeReview),
            (Submitted, AtsBelow) => Some(Rejected),
            (Submitted, EnterReviewQueue) => Some(EmployeeReview),
            // Entering a second reviewer's queue is a no-op stage-wise.
            (EmployeeReview, EnterReviewQueue) => Some(EmployeeReview),
            (Submitted, Approve) | (AtsScreen, Approve) | (EmployeeReview, Approve) => {
                Some(InterviewPending)
            }
            (InterviewPending, ScheduleInterview) => Some(InterviewScheduled),
            (InterviewScheduled, Shortlist) => Some(UnderConsideration),
            (UnderConsideration, ExtendOffer) => Some(Offer),
            (Offer, Hire) => Some(Hired),
            (from, Reject) if !from.is_terminal() => Some(Rejected),
            _ => None,
        };

        next.ok_or_else(|| Error::IllegalTransition {
            from: self.as_str().to_string(),
            event: format!("{:?}", event),
        })
    }
}

impl std::fmt::Display for ApplicationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AtsOutcome {
    Pass,
    Below,
}

/// One candidate's attempt at one job. At most one row per (job, candidate);
/// `profile_snapshot` is frozen at submission time and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub candidate_id: i64,
    pub profile_snapshot: Json<CandidateProfile>,
    pub stage: ApplicationStage,
    pub rejection_reason: String,
    pub ats_score: i64,
    pub ats_outcome: AtsOutcome,
    pub ats_summary: Json<AtsSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
