pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("An application for this job already exists")]
    DuplicateApplication,

    #[error("That slot is no longer available")]
    SlotUnavailable,

    #[error("This assignment has already been decided")]
    AlreadyDecided,

    #[error("Illegal stage transition: {from} on {event}")]
    IllegalTransition { from: String, event: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Conflicts are retryable with different input; callers may re-select
    /// a slot or re-read the queue instead of treating them as fatal.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::DuplicateApplication | Error::SlotUnavailable | Error::AlreadyDecided
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
