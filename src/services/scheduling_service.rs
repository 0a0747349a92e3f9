use crate::config::get_config;
use crate::dto::{OfferSlotPayload, ProposeInterviewPayload};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStage, StageEvent};
use crate::models::availability::AvailabilitySlot;
use crate::models::interview::{Interview, InterviewMode, InterviewStatus};
use crate::services::notification_service::NotificationService;
use chrono::{Duration, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct SchedulingService {
    pool: SqlitePool,
    notifications: NotificationService,
}

impl SchedulingService {
    pub fn new(pool: SqlitePool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Offer an interview slot. A missing end defaults to the configured
    /// slot duration. Overlapping offers from the same employee are allowed
    /// on purpose; the owner manages their own calendar.
    pub async fn offer_slot(
        &self,
        employee_id: i64,
        payload: OfferSlotPayload,
    ) -> Result<AvailabilitySlot> {
        let end = payload
            .end
            .unwrap_or(payload.start + Duration::minutes(get_config().slot_duration_minutes));
        if end <= payload.start {
            return Err(Error::BadRequest(
                "Slot end must be after its start".to_string(),
            ));
        }

        let slot = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            INSERT INTO availability_slots (employee_id, start_at, end_at, is_bookable, created_at)
            VALUES (?, ?, ?, 1, ?)
            RETURNING id, employee_id, start_at, end_at, is_bookable, created_at
            "#,
        )
        .bind(employee_id)
        .bind(payload.start)
        .bind(end)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(slot_id = slot.id, employee_id, "availability slot offered");
        Ok(slot)
    }

    /// Remove a slot. Scoped to the owner; someone else's slot id reads as
    /// absent. Deleting an already-booked slot leaves the interview created
    /// from it untouched, since the interview holds its own copy of the
    /// times.
    pub async fn withdraw_slot(&self, employee_id: i64, slot_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"DELETE FROM availability_slots WHERE id = ? AND employee_id = ?"#,
        )
        .bind(slot_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Slot {} not found", slot_id)));
        }
        Ok(())
    }

    pub async fn slots_for_employee(&self, employee_id: i64) -> Result<Vec<AvailabilitySlot>> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT id, employee_id, start_at, end_at, is_bookable, created_at
            FROM availability_slots
            WHERE employee_id = ?
            ORDER BY start_at ASC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    /// The inventory a candidate picks from: bookable slots of accepted
    /// assignees on the application's job, starting within the scheduling
    /// horizon.
    pub async fn list_open_slots(&self, application_id: i64) -> Result<Vec<AvailabilitySlot>> {
        let now = Utc::now();
        let until = now + Duration::days(get_config().scheduling_horizon_days);
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT s.id, s.employee_id, s.start_at, s.end_at, s.is_bookable, s.created_at
            FROM availability_slots s
            JOIN job_assignees ja ON ja.employee_id = s.employee_id AND ja.status = 'accepted'
            JOIN applications a ON a.job_id = ja.job_id
            WHERE a.id = ? AND s.is_bookable = 1 AND s.start_at >= ? AND s.start_at <= ?
            ORDER BY s.start_at ASC
            "#,
        )
        .bind(application_id)
        .bind(now)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    /// Candidate books a slot. The bookability flip, the re-validation, the
    /// interview insert, and the stage advance are one transaction: of two
    /// concurrent proposals for the same slot, exactly one commits and the
    /// other gets `SlotUnavailable` with no mutation.
    pub async fn propose_interview(
        &self,
        candidate_id: i64,
        payload: ProposeInterviewPayload,
    ) -> Result<Interview> {
        payload.validate()?;

        let mut tx = self.pool.begin().await?;

        // Compare-and-swap on the bookability flag, as the transaction's
        // FIRST statement. A write-first transaction takes the write lock
        // outright, so a concurrent booker waits on the busy timeout instead
        // of both sides holding read locks and one aborting at the upgrade.
        // Once the winner commits, the loser's update affects zero rows.
        // Any validation failure below rolls the flip back with the rest.
        let claimed = sqlx::query(
            r#"UPDATE availability_slots SET is_bookable = 0 WHERE id = ? AND is_bookable = 1"#,
        )
        .bind(payload.slot_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(Error::SlotUnavailable);
        }

        let app = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_id, candidate_id, profile_snapshot, stage, rejection_reason,
                   ats_score, ats_outcome, ats_summary, created_at, updated_at
            FROM applications
            WHERE id = ? AND candidate_id = ?
            "#,
        )
        .bind(payload.application_id)
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("Application {} not found", payload.application_id))
        })?;

        if app.stage != ApplicationStage::InterviewPending {
            return Err(Error::BadRequest(
                "This application is not ready for scheduling".to_string(),
            ));
        }

        // The slot must belong to an accepted assignee of the job and start
        // inside the scheduling horizon. Bookability was already claimed
        // above; anything that fails this read is indistinguishable from a
        // lost booking race for the caller.
        let now = Utc::now();
        let until = now + Duration::days(get_config().scheduling_horizon_days);
        let slot = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT s.id, s.employee_id, s.start_at, s.end_at, s.is_bookable, s.created_at
            FROM availability_slots s
            JOIN job_assignees ja ON ja.employee_id = s.employee_id
            WHERE s.id = ?
              AND ja.job_id = ?
              AND ja.status = 'accepted'
              AND s.start_at >= ?
              AND s.start_at <= ?
            "#,
        )
        .bind(payload.slot_id)
        .bind(app.job_id)
        .bind(now)
        .bind(until)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(Error::SlotUnavailable)?;

        let location_text = match payload.mode {
            InterviewMode::InPerson => payload.location_text.clone().unwrap_or_default(),
            InterviewMode::Online => String::new(),
        };

        let interview = sqlx::query_as::<_, Interview>(
            r#"
            INSERT INTO interviews
                (application_id, mode, start_at, end_at, status, location_text,
                 invite_sent_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, application_id, mode, start_at, end_at, status, location_text,
                      meeting_id, join_url, host_url, invite_sent_at,
                      reminder_48h_sent, reminder_24h_sent, created_at, updated_at
            "#,
        )
        .bind(app.id)
        .bind(payload.mode)
        .bind(slot.start_at)
        .bind(slot.end_at)
        .bind(InterviewStatus::AwaitingEmpConfirm)
        .bind(&location_text)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // The slot owner interviews.
        sqlx::query(
            r#"INSERT INTO interviewer_assignments (interview_id, employee_id) VALUES (?, ?)"#,
        )
        .bind(interview.id)
        .bind(slot.employee_id)
        .execute(&mut *tx)
        .await?;

        let next = app.stage.transition(StageEvent::ScheduleInterview)?;
        sqlx::query(r#"UPDATE applications SET stage = ?, updated_at = ? WHERE id = ?"#)
            .bind(next)
            .bind(now)
            .bind(app.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            interview_id = interview.id,
            application_id = app.id,
            slot_id = slot.id,
            "interview proposed"
        );

        // The booking is committed; a dead notification channel must not
        // turn it into an error for the caller.
        if let Err(err) = self.notify_slot_owner(app.id, &interview, slot.employee_id).await {
            warn!(
                interview_id = interview.id,
                error = ?err,
                "interviewer notification failed"
            );
        }

        Ok(interview)
    }

    async fn notify_slot_owner(
        &self,
        application_id: i64,
        interview: &Interview,
        employee_id: i64,
    ) -> Result<()> {
        let row = sqlx::query(
            r#"
            SELECT u.name AS candidate_name, j.title AS job_title
            FROM applications a
            JOIN users u ON u.id = a.candidate_id
            JOIN jobs j ON j.id = a.job_id
            WHERE a.id = ?
            "#,
        )
        .bind(application_id)
        .fetch_one(&self.pool)
        .await?;
        let candidate_name: String = row.try_get("candidate_name")?;
        let job_title: String = row.try_get("job_title")?;

        self.notifications
            .notify(
                employee_id,
                "Interview to confirm",
                &format!(
                    "{} requested {} for {}.",
                    candidate_name,
                    interview.start_at.format("%b %d, %Y %H:%M"),
                    job_title
                ),
                Some("/interviews/pending"),
                true,
            )
            .await?;
        Ok(())
    }
}
