use hireflow::{
    config::{get_config, init_config},
    database::pool::create_pool,
    AppState,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reminder worker: applies migrations, then sweeps for due 48h/24h
/// interview reminders on a fixed interval. The sweep is idempotent, so
/// overlapping or restarted runs are harmless.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool);
    let interval = Duration::from_secs(config.reminder_sweep_interval_secs);
    info!(interval_secs = interval.as_secs(), "reminder worker started");

    loop {
        match state
            .interview_service
            .run_reminder_sweep(chrono::Utc::now())
            .await
        {
            Ok(report) => {
                if report.sent_48h + report.sent_24h > 0 {
                    info!(
                        sent_48h = report.sent_48h,
                        sent_24h = report.sent_24h,
                        "sweep complete"
                    );
                }
            }
            Err(e) => {
                tracing::error!(error = ?e, "reminder sweep failed");
            }
        }
        tokio::time::sleep(interval).await;
    }
}
