use crate::config::get_config;
use crate::dto::DecidePayload;
use crate::error::{Error, Result};
use crate::models::application::{ApplicationStage, StageEvent};
use crate::models::review::{QueueItem, ReviewAssignment, ReviewDecision};
use crate::services::notification_service::NotificationService;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct ReviewService {
    pool: SqlitePool,
    notifications: NotificationService,
}

impl ReviewService {
    pub fn new(pool: SqlitePool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Pull unassigned applications into this employee's review queue.
    ///
    /// Only jobs where the employee holds an `accepted` assignment qualify;
    /// applications already assigned to this employee are skipped, so the
    /// call is an idempotent no-op when re-run. Returns how many assignments
    /// were created.
    pub async fn build_queue(&self, employee_id: i64) -> Result<u64> {
        let batch = get_config().queue_batch_size;
        let mut tx = self.pool.begin().await?;

        let candidates = sqlx::query(
            r#"
            SELECT a.id, a.stage
            FROM applications a
            JOIN job_assignees ja ON ja.job_id = a.job_id
            WHERE ja.employee_id = ?
              AND ja.status = 'accepted'
              AND a.stage IN ('submitted', 'employee_review')
              AND NOT EXISTS (
                  SELECT 1 FROM review_assignments ra
                  WHERE ra.application_id = a.id AND ra.employee_id = ?
              )
            ORDER BY a.created_at ASC
            LIMIT ?
            "#,
        )
        .bind(employee_id)
        .bind(employee_id)
        .bind(batch)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now();
        let mut created = 0u64;
        for row in candidates {
            let application_id: i64 = row.try_get("id")?;
            let stage: ApplicationStage = row.try_get("stage")?;

            // Get-or-create keyed on (application, employee); a concurrent
            // build of the same queue loses the insert and counts nothing.
            let result = sqlx::query(
                r#"
                INSERT INTO review_assignments (application_id, employee_id, created_at)
                VALUES (?, ?, ?)
                ON CONFLICT (application_id, employee_id) DO NOTHING
                "#,
            )
            .bind(application_id)
            .bind(employee_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                continue;
            }
            created += 1;

            if stage == ApplicationStage::Submitted {
                let next = stage.transition(StageEvent::EnterReviewQueue)?;
                sqlx::query(
                    r#"UPDATE applications SET stage = ?, updated_at = ? WHERE id = ?"#,
                )
                .bind(next)
                .bind(now)
                .bind(application_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(employee_id, created, "review queue built");
        Ok(created)
    }

    /// Undecided assignments for this employee, oldest application first.
    pub async fn employee_queue(&self, employee_id: i64) -> Result<Vec<QueueItem>> {
        let items = sqlx::query_as::<_, QueueItem>(
            r#"
            SELECT ra.id AS assignment_id,
                   a.id AS application_id,
                   j.id AS job_id,
                   j.title AS job_title,
                   u.id AS candidate_id,
                   u.name AS candidate_name,
                   a.ats_score,
                   a.created_at AS application_created_at
            FROM review_assignments ra
            JOIN applications a ON a.id = ra.application_id
            JOIN jobs j ON j.id = a.job_id
            JOIN users u ON u.id = a.candidate_id
            WHERE ra.employee_id = ? AND ra.decision IS NULL
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Record a reviewer's decision and advance the application in one
    /// transaction. A decision, once recorded, is immutable.
    pub async fn decide(
        &self,
        employee_id: i64,
        payload: DecidePayload,
    ) -> Result<ReviewAssignment> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;

        // Ownership check first: a foreign assignment id reads as absent,
        // never as somebody else's data.
        let existing = sqlx::query(
            r#"
            SELECT application_id, decision IS NOT NULL AS decided
            FROM review_assignments
            WHERE id = ? AND employee_id = ?
            "#,
        )
        .bind(payload.assignment_id)
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("Assignment {} not found", payload.assignment_id))
        })?;

        if existing.try_get::<bool, _>("decided")? {
            return Err(Error::AlreadyDecided);
        }
        let application_id: i64 = existing.try_get("application_id")?;

        let now = Utc::now();
        let updated = sqlx::query(
            r#"
            UPDATE review_assignments
            SET decision = ?, decision_notes = ?, decided_at = ?
            WHERE id = ? AND employee_id = ? AND decision IS NULL
            "#,
        )
        .bind(payload.decision)
        .bind(&payload.notes)
        .bind(now)
        .bind(payload.assignment_id)
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::AlreadyDecided);
        }

        let stage: ApplicationStage =
            sqlx::query_scalar(r#"SELECT stage FROM applications WHERE id = ?"#)
                .bind(application_id)
                .fetch_one(&mut *tx)
                .await?;

        match payload.decision {
            ReviewDecision::Approve => {
                // The first approval advances the stage; a later reviewer's
                // approval of an already-advanced application changes nothing.
                if matches!(
                    stage,
                    ApplicationStage::Submitted
                        | ApplicationStage::AtsScreen
                        | ApplicationStage::EmployeeReview
                ) {
                    let next = stage.transition(StageEvent::Approve)?;
                    sqlx::query(
                        r#"UPDATE applications SET stage = ?, updated_at = ? WHERE id = ?"#,
                    )
                    .bind(next)
                    .bind(now)
                    .bind(application_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            ReviewDecision::Reject => {
                if !stage.is_terminal() {
                    let next = stage.transition(StageEvent::Reject)?;
                    let reason = if payload.notes.trim().is_empty() {
                        "Rejected by reviewer."
                    } else {
                        payload.notes.as_str()
                    };
                    sqlx::query(
                        r#"
                        UPDATE applications
                        SET stage = ?, rejection_reason = ?, updated_at = ?
                        WHERE id = ?
                        "#,
                    )
                    .bind(next)
                    .bind(reason)
                    .bind(now)
                    .bind(application_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;

        let assignment = self.get_assignment(payload.assignment_id).await?;

        // The decision is committed; a dead notification channel must not
        // turn it into an error for the reviewer.
        if let Err(err) = self.notify_candidate(application_id, payload.decision).await {
            warn!(application_id, error = ?err, "candidate notification failed");
        }

        info!(
            assignment_id = assignment.id,
            application_id,
            decision = ?payload.decision,
            "review decision recorded"
        );
        Ok(assignment)
    }

    async fn notify_candidate(&self, application_id: i64, decision: ReviewDecision) -> Result<()> {
        let row = sqlx::query(
            r#"
            SELECT a.candidate_id, a.job_id, j.title, j.company_name
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.id = ?
            "#,
        )
        .bind(application_id)
        .fetch_one(&self.pool)
        .await?;
        let candidate_id: i64 = row.try_get("candidate_id")?;
        let job_id: i64 = row.try_get("job_id")?;
        let title: String = row.try_get("title")?;
        let company: String = row.try_get("company_name")?;

        match decision {
            ReviewDecision::Approve => {
                self.notifications
                    .notify(
                        candidate_id,
                        "Approved for interview",
                        &format!(
                            "You're approved to schedule an interview for {} at {}.",
                            title, company
                        ),
                        Some(&format!("/applications/{}/schedule", application_id)),
                        true,
                    )
                    .await?;
            }
            ReviewDecision::Reject => {
                self.notifications
                    .notify(
                        candidate_id,
                        "Application update",
                        &format!(
                            "Your application for {} at {} was not selected.",
                            title, company
                        ),
                        Some(&format!("/jobs/{}", job_id)),
                        true,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn get_assignment(&self, id: i64) -> Result<ReviewAssignment> {
        let assignment = sqlx::query_as::<_, ReviewAssignment>(
            r#"
            SELECT id, application_id, employee_id, is_owner, decision,
                   decision_notes, decided_at, created_at
            FROM review_assignments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Assignment {} not found", id)))?;
        Ok(assignment)
    }
}
