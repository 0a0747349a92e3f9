use crate::models::interview::InterviewMode;
use crate::models::profile::CandidateProfile;
use crate::models::review::ReviewDecision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitApplicationPayload {
    pub job_id: i64,
    pub candidate_id: i64,
    /// Frozen onto the application verbatim; scoring reads this copy, not
    /// the live profile.
    #[validate(nested)]
    pub profile: CandidateProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecidePayload {
    pub assignment_id: i64,
    pub decision: ReviewDecision,
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferSlotPayload {
    pub start: DateTime<Utc>,
    /// Defaults to `start` plus the configured slot duration.
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProposeInterviewPayload {
    pub application_id: i64,
    pub slot_id: i64,
    pub mode: InterviewMode,
    #[validate(length(max = 255))]
    pub location_text: Option<String>,
}
