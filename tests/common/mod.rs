#![allow(dead_code)]

use chrono::{DateTime, Utc};
use hireflow::models::profile::{CandidateProfile, Project};
use hireflow::AppState;
use sqlx::SqlitePool;

/// Fresh in-memory database with the full schema applied.
pub async fn test_state() -> AppState {
    let pool = hireflow::database::pool::connect("sqlite::memory:")
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    AppState::new(pool)
}

static USER_SEQ: std::sync::atomic::AtomicI64 = std::sync::atomic::AtomicI64::new(0);

pub async fn seed_user(pool: &SqlitePool, name: &str, role: &str) -> i64 {
    let seq = USER_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    sqlx::query_scalar(
        r#"INSERT INTO users (name, email, role, created_at) VALUES (?, ?, ?, ?) RETURNING id"#,
    )
    .bind(name)
    .bind(format!(
        "{}.{}@example.com",
        name.to_lowercase().replace(' ', "."),
        seq
    ))
    .bind(role)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("seed user")
}

pub async fn seed_job(
    pool: &SqlitePool,
    title: &str,
    required: &[&str],
    tools: &[&str],
    visa_sponsorship: bool,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO jobs (company_name, title, required_qualifications, tools,
                          visa_sponsorship, status, created_at)
        VALUES (?, ?, ?, ?, ?, 'open', ?)
        RETURNING id
        "#,
    )
    .bind("Acme")
    .bind(title)
    .bind(serde_json::to_string(required).unwrap())
    .bind(serde_json::to_string(tools).unwrap())
    .bind(visa_sponsorship)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("seed job")
}

pub async fn assign_employee(pool: &SqlitePool, job_id: i64, employee_id: i64, status: &str) {
    sqlx::query(
        r#"INSERT INTO job_assignees (job_id, employee_id, status) VALUES (?, ?, ?)"#,
    )
    .bind(job_id)
    .bind(employee_id)
    .bind(status)
    .execute(pool)
    .await
    .expect("seed assignee");
}

/// Insert an application row directly, bypassing screening, to set up a
/// specific pipeline stage.
pub async fn seed_application(
    pool: &SqlitePool,
    job_id: i64,
    candidate_id: i64,
    stage: &str,
    created_at: DateTime<Utc>,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO applications
            (job_id, candidate_id, profile_snapshot, stage, created_at, updated_at)
        VALUES (?, ?, '{}', ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(job_id)
    .bind(candidate_id)
    .bind(stage)
    .bind(created_at)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .expect("seed application")
}

/// Scores 85 against a ["python", "react"] / ["django", "docker"] job:
/// full requirement and tool coverage, five projects, a code link.
pub fn strong_profile() -> CandidateProfile {
    CandidateProfile {
        skills: vec![
            "Python".into(),
            "React".into(),
            "Django".into(),
            "Docker".into(),
        ],
        projects: (0..5)
            .map(|i| Project {
                title: format!("Project {}", i),
                technologies: vec!["python".into()],
                link: None,
            })
            .collect(),
        github_url: Some("https://github.com/strong-candidate".into()),
        ..Default::default()
    }
}

/// Scores 35 against the same job (the worked screening example).
pub fn weak_profile() -> CandidateProfile {
    CandidateProfile {
        skills: vec!["python".into(), "django".into()],
        ..Default::default()
    }
}

pub async fn notifications_for(pool: &SqlitePool, user_id: i64) -> Vec<(String, String)> {
    sqlx::query_as::<_, (String, String)>(
        r#"SELECT title, link FROM notifications WHERE user_id = ? ORDER BY id ASC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .expect("notifications")
}
