use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Minimum ATS score (0-100) that routes an application to human review.
    pub ats_threshold: u8,
    /// Default slot length when an offer omits its end time.
    pub slot_duration_minutes: i64,
    /// How far ahead a candidate may book, in days.
    pub scheduling_horizon_days: i64,
    /// Cap on applications pulled into a reviewer's queue per build.
    pub queue_batch_size: i64,
    pub reminder_sweep_interval_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
            ats_threshold: get_env_or("ATS_THRESHOLD", 70)?,
            slot_duration_minutes: get_env_or("SLOT_DURATION_MINUTES", 60)?,
            scheduling_horizon_days: get_env_or("SCHEDULING_HORIZON_DAYS", 21)?,
            queue_batch_size: get_env_or("QUEUE_BATCH_SIZE", 20)?,
            reminder_sweep_interval_secs: get_env_or("REMINDER_SWEEP_INTERVAL_SECS", 300)?,
        })
    }
}

fn get_env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::from_env().expect("valid configuration"))
}
