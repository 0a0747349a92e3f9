use crate::error::{Error, Result};
use crate::models::interview::{Interview, InterviewMode, InterviewStatus};
use crate::services::notification_service::NotificationService;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

/// Reminders fire for interviews starting within this half-width around
/// the 48h / 24h horizon.
const REMINDER_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub sent_48h: u64,
    pub sent_24h: u64,
}

#[derive(Clone)]
pub struct InterviewService {
    pool: SqlitePool,
    notifications: NotificationService,
}

impl InterviewService {
    pub fn new(pool: SqlitePool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Interviews waiting on this interviewer's confirmation, soonest first.
    pub async fn pending_confirmations(&self, employee_id: i64) -> Result<Vec<Interview>> {
        let interviews = sqlx::query_as::<_, Interview>(
            r#"
            SELECT i.id, i.application_id, i.mode, i.start_at, i.end_at, i.status,
                   i.location_text, i.meeting_id, i.join_url, i.host_url, i.invite_sent_at,
                   i.reminder_48h_sent, i.reminder_24h_sent, i.created_at, i.updated_at
            FROM interviews i
            JOIN interviewer_assignments ia ON ia.interview_id = i.id
            WHERE ia.employee_id = ? AND i.status = 'awaiting_emp_confirm'
            ORDER BY i.start_at ASC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    /// Interviewer confirms a proposed time. Online interviews receive their
    /// meeting identifiers here, exactly once; a re-confirmation attempt
    /// fails on the status guard and regenerates nothing.
    pub async fn confirm(&self, employee_id: i64, interview_id: i64) -> Result<Interview> {
        let mut tx = self.pool.begin().await?;

        let interview = sqlx::query_as::<_, Interview>(
            r#"
            SELECT i.id, i.application_id, i.mode, i.start_at, i.end_at, i.status,
                   i.location_text, i.meeting_id, i.join_url, i.host_url, i.invite_sent_at,
                   i.reminder_48h_sent, i.reminder_24h_sent, i.created_at, i.updated_at
            FROM interviews i
            JOIN interviewer_assignments ia ON ia.interview_id = i.id
            WHERE i.id = ? AND ia.employee_id = ?
            "#,
        )
        .bind(interview_id)
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Interview {} not found", interview_id)))?;

        if interview.status != InterviewStatus::AwaitingEmpConfirm {
            return Err(Error::BadRequest(
                "Interview is not awaiting confirmation".to_string(),
            ));
        }

        let (meeting_id, join_url, host_url) =
            if interview.mode == InterviewMode::Online && interview.meeting_id.is_empty() {
                let meeting_id = format!("hireflow-{}-{}", interview.id, Uuid::new_v4().simple());
                let join_url = format!("https://meet.hireflow.example/join/{}", meeting_id);
                let host_url = format!("https://meet.hireflow.example/host/{}", meeting_id);
                (meeting_id, join_url, host_url)
            } else {
                (
                    interview.meeting_id.clone(),
                    interview.join_url.clone(),
                    interview.host_url.clone(),
                )
            };

        // Status guard doubles as the race check between two panelists
        // confirming at once.
        let updated = sqlx::query(
            r#"
            UPDATE interviews
            SET status = ?, meeting_id = ?, join_url = ?, host_url = ?, updated_at = ?
            WHERE id = ? AND status = 'awaiting_emp_confirm'
            "#,
        )
        .bind(InterviewStatus::Confirmed)
        .bind(&meeting_id)
        .bind(&join_url)
        .bind(&host_url)
        .bind(Utc::now())
        .bind(interview.id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(Error::BadRequest(
                "Interview is not awaiting confirmation".to_string(),
            ));
        }

        tx.commit().await?;

        let confirmed = self.get(interview.id).await?;
        info!(interview_id = confirmed.id, "interview confirmed");

        // The confirmation is committed; a dead notification channel must
        // not turn it into an error for the interviewer.
        if let Err(err) = self.notify_candidate_confirmed(&confirmed).await {
            warn!(
                interview_id = confirmed.id,
                error = ?err,
                "candidate notification failed"
            );
        }

        Ok(confirmed)
    }

    async fn notify_candidate_confirmed(&self, confirmed: &Interview) -> Result<()> {
        let (candidate_id, job_title) = self.application_context(confirmed.application_id).await?;
        let extra = if confirmed.join_url.is_empty() {
            String::new()
        } else {
            format!(" Join: {}", confirmed.join_url)
        };
        self.notifications
            .notify(
                candidate_id,
                "Interview confirmed",
                &format!(
                    "{} for {} is confirmed.{}",
                    confirmed.start_at.format("%b %d, %Y %H:%M"),
                    job_title,
                    extra
                ),
                Some("/dashboard"),
                true,
            )
            .await?;
        Ok(())
    }

    /// Send 48h and 24h reminders to candidate and interviewers. Each flag
    /// is flipped with a guarded update before anything is sent, so the
    /// sweep can run at any frequency, or twice at once, without duplicate
    /// notifications.
    pub async fn run_reminder_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        report.sent_48h = self.sweep_horizon(now, 48, "reminder_48h_sent").await?;
        report.sent_24h = self.sweep_horizon(now, 24, "reminder_24h_sent").await?;
        if report.sent_48h + report.sent_24h > 0 {
            info!(
                sent_48h = report.sent_48h,
                sent_24h = report.sent_24h,
                "interview reminders sent"
            );
        }
        Ok(report)
    }

    async fn sweep_horizon(
        &self,
        now: DateTime<Utc>,
        hours: i64,
        flag_column: &str,
    ) -> Result<u64> {
        let window_start = now + Duration::hours(hours) - Duration::minutes(REMINDER_WINDOW_MINUTES);
        let window_end = now + Duration::hours(hours) + Duration::minutes(REMINDER_WINDOW_MINUTES);

        let due = sqlx::query(&format!(
            r#"
            SELECT i.id, i.application_id, i.start_at
            FROM interviews i
            WHERE i.status = 'confirmed'
              AND i.start_at >= ?
              AND i.start_at <= ?
              AND i.{flag} = 0
            "#,
            flag = flag_column
        ))
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        let mut sent = 0u64;
        for row in due {
            let interview_id: i64 = row.try_get("id")?;
            let application_id: i64 = row.try_get("application_id")?;
            let start_at: DateTime<Utc> = row.try_get("start_at")?;

            // One-shot flag: whoever flips it sends; a concurrent sweep of
            // the same interview affects zero rows and sends nothing.
            let flipped = sqlx::query(&format!(
                r#"UPDATE interviews SET {flag} = 1 WHERE id = ? AND {flag} = 0"#,
                flag = flag_column
            ))
            .bind(interview_id)
            .execute(&self.pool)
            .await?;
            if flipped.rows_affected() == 0 {
                continue;
            }
            sent += 1;

            // Flag already flipped; a notification failure here is logged
            // and must not abort the rest of the sweep.
            if let Err(err) = self
                .send_reminders(interview_id, application_id, start_at, hours)
                .await
            {
                warn!(interview_id, error = ?err, "reminder notification failed");
            }
        }
        Ok(sent)
    }

    async fn send_reminders(
        &self,
        interview_id: i64,
        application_id: i64,
        start_at: DateTime<Utc>,
        hours: i64,
    ) -> Result<()> {
        let (candidate_id, job_title) = self.application_context(application_id).await?;
        let title = format!("Interview in {} hours", hours);
        let message = format!(
            "Reminder: your interview for {} on {}.",
            job_title,
            start_at.format("%b %d, %Y %H:%M")
        );

        self.notifications
            .notify(candidate_id, &title, &message, None, true)
            .await?;

        let interviewer_ids: Vec<i64> = sqlx::query_scalar(
            r#"SELECT employee_id FROM interviewer_assignments WHERE interview_id = ?"#,
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;
        for employee_id in interviewer_ids {
            self.notifications
                .notify(employee_id, &title, &message, None, true)
                .await?;
        }
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Interview> {
        let interview = sqlx::query_as::<_, Interview>(
            r#"
            SELECT id, application_id, mode, start_at, end_at, status, location_text,
                   meeting_id, join_url, host_url, invite_sent_at,
                   reminder_48h_sent, reminder_24h_sent, created_at, updated_at
            FROM interviews
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Interview {} not found", id)))?;
        Ok(interview)
    }

    async fn application_context(&self, application_id: i64) -> Result<(i64, String)> {
        let row = sqlx::query(
            r#"
            SELECT a.candidate_id, j.title
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE a.id = ?
            "#,
        )
        .bind(application_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((row.try_get("candidate_id")?, row.try_get("title")?))
    }
}
