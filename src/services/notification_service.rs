use crate::error::Result;
use crate::models::notification::Notification;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

/// Outbound email transport. Delivery lives outside the core; the default
/// implementation only logs. Failures are swallowed by `notify` so a dead
/// mail channel can never fail a pipeline transition.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Default transport: trace the mail and report success.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        tracing::info!(to, subject, "email dispatched");
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_mailer(pool, Arc::new(LogMailer))
    }

    pub fn with_mailer(pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Record a notification for `user_id` and best-effort email it. The
    /// record always persists; only `email_sent` reflects delivery.
    pub async fn notify(
        &self,
        user_id: i64,
        title: &str,
        message: &str,
        link: Option<&str>,
        send_email: bool,
    ) -> Result<Notification> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO notifications (user_id, title, message, link, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(link.unwrap_or(""))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let mut email_sent = false;
        if send_email {
            let email: Option<String> =
                sqlx::query_scalar(r#"SELECT email FROM users WHERE id = ?"#)
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?;

            if let Some(email) = email {
                let mut body = message.to_string();
                if let Some(link) = link {
                    body.push_str(&format!("\n\nOpen: {}", link));
                }
                match self.mailer.send(&email, title, &body) {
                    Ok(()) => {
                        email_sent = true;
                        sqlx::query(r#"UPDATE notifications SET email_sent = 1 WHERE id = ?"#)
                            .bind(id)
                            .execute(&self.pool)
                            .await?;
                    }
                    Err(err) => {
                        warn!(user_id, title, error = ?err, "email delivery failed");
                    }
                }
            }
        }

        Ok(Notification {
            id,
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            link: link.unwrap_or("").to_string(),
            is_read: false,
            email_sent,
            created_at: now,
        })
    }

    pub async fn unread_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, title, message, link, is_read, email_sent, created_at
            FROM notifications
            WHERE user_id = ? AND is_read = 0
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("smtp connection refused"))
        }
    }

    async fn pool_with_user() -> (SqlitePool, i64) {
        let pool = crate::database::pool::connect("sqlite::memory:")
            .await
            .expect("pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        let user_id: i64 = sqlx::query_scalar(
            r#"INSERT INTO users (name, email, role, created_at)
               VALUES ('Test User', 'test@example.com', 'candidate', ?)
               RETURNING id"#,
        )
        .bind(Utc::now())
        .fetch_one(&pool)
        .await
        .expect("seed user");
        (pool, user_id)
    }

    #[tokio::test]
    async fn mailer_failure_never_propagates() {
        let (pool, user_id) = pool_with_user().await;
        let service = NotificationService::with_mailer(pool, Arc::new(FailingMailer));

        let n = service
            .notify(user_id, "Test", "body", Some("/link"), true)
            .await
            .expect("notify succeeds despite dead mail channel");
        assert!(!n.email_sent);

        // The record persisted regardless.
        let unread = service.unread_for_user(user_id).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Test");
        assert_eq!(unread[0].link, "/link");
    }

    #[tokio::test]
    async fn successful_mail_is_flagged_on_the_record() {
        let (pool, user_id) = pool_with_user().await;
        let service = NotificationService::new(pool);

        let n = service
            .notify(user_id, "Test", "body", None, true)
            .await
            .unwrap();
        assert!(n.email_sent);

        let n = service
            .notify(user_id, "Quiet", "body", None, false)
            .await
            .unwrap();
        assert!(!n.email_sent);
    }
}
