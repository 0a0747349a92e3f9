use crate::config::get_config;
use crate::dto::SubmitApplicationPayload;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStage, AtsOutcome, StageEvent};
use crate::models::job::Job;
use crate::services::notification_service::NotificationService;
use crate::services::scoring::score_profile_against_job;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct ApplicationService {
    pool: SqlitePool,
    notifications: NotificationService,
}

impl ApplicationService {
    pub fn new(pool: SqlitePool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Submit an application and screen it in the same call. The stage the
    /// row is born with already reflects the screening outcome, so no
    /// application is ever observable in `ats_screen`.
    pub async fn submit(&self, payload: SubmitApplicationPayload) -> Result<Application> {
        payload.validate()?;

        // Role is verified upstream by the identity provider; the core only
        // gates on what it finds there.
        let role: Option<String> = sqlx::query_scalar(r#"SELECT role FROM users WHERE id = ?"#)
            .bind(payload.candidate_id)
            .fetch_optional(&self.pool)
            .await?;
        match role.as_deref() {
            Some("candidate") => {}
            Some(_) => {
                return Err(Error::Forbidden("Only candidates can apply".to_string()));
            }
            None => {
                return Err(Error::NotFound(format!(
                    "User {} not found",
                    payload.candidate_id
                )))
            }
        }

        let job = self.open_job(payload.job_id).await?;

        let (score, summary) = score_profile_against_job(&payload.profile, &job);

        let passed = score >= get_config().ats_threshold;
        let (event, outcome) = if passed {
            (StageEvent::AtsPass, AtsOutcome::Pass)
        } else {
            (StageEvent::AtsBelow, AtsOutcome::Below)
        };
        let stage = ApplicationStage::Submitted.transition(event)?;
        let rejection_reason = if passed {
            ""
        } else {
            "ATS screening below threshold."
        };

        let now = Utc::now();
        let inserted = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (job_id, candidate_id, profile_snapshot, stage, rejection_reason,
                 ats_score, ats_outcome, ats_summary, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, job_id, candidate_id, profile_snapshot, stage, rejection_reason,
                      ats_score, ats_outcome, ats_summary, created_at, updated_at
            "#,
        )
        .bind(payload.job_id)
        .bind(payload.candidate_id)
        .bind(serde_json::to_string(&payload.profile)?)
        .bind(stage)
        .bind(rejection_reason)
        .bind(score as i64)
        .bind(outcome)
        .bind(serde_json::to_string(&summary)?)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        let application = match inserted {
            Ok(row) => row,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(Error::DuplicateApplication)
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            application_id = application.id,
            job_id = job.id,
            score,
            stage = %application.stage,
            "application screened"
        );

        // The application is stored; a dead notification channel must not
        // turn the submission into an error.
        let job_link = format!("/jobs/{}", job.id);
        let notified = if passed {
            self.notifications
                .notify(
                    payload.candidate_id,
                    "Passed ATS",
                    &format!(
                        "You passed initial screening for {} at {}.",
                        job.title, job.company_name
                    ),
                    Some(&job_link),
                    true,
                )
                .await
        } else {
            self.notifications
                .notify(
                    payload.candidate_id,
                    "Application update",
                    &format!(
                        "Your application for {} at {} did not pass initial screening.",
                        job.title, job.company_name
                    ),
                    Some(&job_link),
                    true,
                )
                .await
        };
        if let Err(err) = notified {
            warn!(
                application_id = application.id,
                error = ?err,
                "candidate notification failed"
            );
        }

        Ok(application)
    }

    pub async fn get(&self, id: i64) -> Result<Application> {
        let app = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_id, candidate_id, profile_snapshot, stage, rejection_reason,
                   ats_score, ats_outcome, ats_summary, created_at, updated_at
            FROM applications
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        Ok(app)
    }

    pub async fn list_for_candidate(&self, candidate_id: i64) -> Result<Vec<Application>> {
        let apps = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_id, candidate_id, profile_snapshot, stage, rejection_reason,
                   ats_score, ats_outcome, ats_summary, created_at, updated_at
            FROM applications
            WHERE candidate_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(apps)
    }

    async fn open_job(&self, job_id: i64) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, company_name, title, required_qualifications, tools,
                   visa_sponsorship, status, created_at
            FROM jobs
            WHERE id = ? AND status = 'open'
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Open job {} not found", job_id)))?;
        Ok(job)
    }
}
