use serde::{Deserialize, Serialize};
use validator::Validate;

/// Candidate profile fields consumed by screening. Owned and validated by
/// the profile collaborator; the core freezes a copy of this onto each
/// application at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CandidateProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub visa_status: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Project {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}
