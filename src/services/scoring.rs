//! ATS screening heuristic. Pure and deterministic: the same profile and
//! job always produce the same score, no I/O anywhere.

use crate::models::job::Job;
use crate::models::profile::CandidateProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of listed projects that can contribute to the score.
const PROJECT_CAP: usize = 5;

/// Transparent breakdown stored alongside the score on the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsSummary {
    pub req_match_pct: i32,
    pub tools_match_pct: i32,
    /// Reported for transparency only; by contract this term is NOT folded
    /// into the weighted base score.
    pub project_bonus_pct: i32,
    pub has_github: bool,
    pub visa_cap_applied: bool,
}

fn norm_list(xs: &[String]) -> HashSet<String> {
    xs.iter()
        .map(|x| x.trim().to_lowercase())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Compatibility score between a candidate profile and a job's requirements.
///
/// Weighted blend: 50% required-qualification match, 20% tools match, 10%
/// project count (capped at five), 5% for a public code link. If the job
/// offers no visa sponsorship and the profile's visa text suggests the
/// candidate needs it, anything above 50 is capped to exactly 50.
pub fn score_profile_against_job(profile: &CandidateProfile, job: &Job) -> (u8, AtsSummary) {
    let p_skills = norm_list(&profile.skills);
    let has_github = profile
        .github_url
        .as_deref()
        .map(|u| !u.trim().is_empty())
        .unwrap_or(false);

    let j_req = norm_list(&job.required_qualifications);
    let j_tools = norm_list(&job.tools);

    let req_total = j_req.len().max(1) as f64;
    let tools_total = j_tools.len().max(1) as f64;
    let req_match = p_skills.intersection(&j_req).count() as f64 / req_total;
    let tools_match = p_skills.intersection(&j_tools).count() as f64 / tools_total;

    // +2% per project whose technologies touch the job's stack, first five
    // projects only.
    let relevant: HashSet<&String> = j_req.union(&j_tools).collect();
    let mut project_bonus = 0.0_f64;
    for project in profile.projects.iter().take(PROJECT_CAP) {
        let techs = norm_list(&project.technologies);
        if techs.iter().any(|t| relevant.contains(t)) {
            project_bonus += 0.02;
        }
    }

    let project_count = profile.projects.len().min(PROJECT_CAP) as f64;

    let base = 0.50 * req_match
        + 0.20 * tools_match
        + 0.10 * (project_count / PROJECT_CAP as f64)
        + 0.05 * if has_github { 1.0 } else { 0.0 };

    // Half-point values round to the even neighbor, matching the reference
    // scores this heuristic was calibrated against.
    let mut score = (base * 100.0).round_ties_even() as i32;

    let mut visa_cap_applied = false;
    let visa_text = profile
        .visa_status
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    if !job.visa_sponsorship
        && (visa_text.contains("sponsor") || visa_text.contains("visa"))
        && score > 50
    {
        score = 50;
        visa_cap_applied = true;
    }

    let summary = AtsSummary {
        req_match_pct: (req_match * 100.0).round_ties_even() as i32,
        tools_match_pct: (tools_match * 100.0).round_ties_even() as i32,
        project_bonus_pct: (project_bonus * 100.0).round_ties_even() as i32,
        has_github,
        visa_cap_applied,
    };

    (score.clamp(0, 100) as u8, summary)
}
