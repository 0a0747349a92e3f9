mod common;

use chrono::{Duration, Utc};
use common::*;
use hireflow::dto::DecidePayload;
use hireflow::error::Error;
use hireflow::models::application::ApplicationStage;
use hireflow::models::review::ReviewDecision;

#[tokio::test]
async fn build_queue_assigns_and_advances_submitted_applications() {
    let state = test_state().await;
    let reviewer = seed_user(&state.pool, "Rae Reviewer", "employee").await;
    let job = seed_job(&state.pool, "Backend Engineer", &["python"], &[], true).await;
    assign_employee(&state.pool, job, reviewer, "accepted").await;

    let c1 = seed_user(&state.pool, "One Candidate", "candidate").await;
    let c2 = seed_user(&state.pool, "Two Candidate", "candidate").await;
    let now = Utc::now();
    let a1 = seed_application(&state.pool, job, c1, "submitted", now).await;
    let a2 = seed_application(&state.pool, job, c2, "employee_review", now).await;

    let created = state.review_service.build_queue(reviewer).await.unwrap();
    assert_eq!(created, 2);

    // Entering the queue advances still-submitted applications.
    let stage: String = sqlx::query_scalar(r#"SELECT stage FROM applications WHERE id = ?"#)
        .bind(a1)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(stage, "employee_review");

    let queue = state.review_service.employee_queue(reviewer).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().any(|q| q.application_id == a2));
}

#[tokio::test]
async fn build_queue_is_idempotent() {
    let state = test_state().await;
    let reviewer = seed_user(&state.pool, "Rae Reviewer", "employee").await;
    let job = seed_job(&state.pool, "Backend Engineer", &["python"], &[], true).await;
    assign_employee(&state.pool, job, reviewer, "accepted").await;
    let c1 = seed_user(&state.pool, "One Candidate", "candidate").await;
    seed_application(&state.pool, job, c1, "submitted", Utc::now()).await;

    assert_eq!(state.review_service.build_queue(reviewer).await.unwrap(), 1);
    assert_eq!(state.review_service.build_queue(reviewer).await.unwrap(), 0);

    let count: i64 =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM review_assignments WHERE employee_id = ?"#)
            .bind(reviewer)
            .fetch_one(&state.pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn build_queue_requires_accepted_assignment() {
    let state = test_state().await;
    let reviewer = seed_user(&state.pool, "Iv Invited", "employee").await;
    let job = seed_job(&state.pool, "Backend Engineer", &["python"], &[], true).await;
    assign_employee(&state.pool, job, reviewer, "invited").await;
    let c1 = seed_user(&state.pool, "One Candidate", "candidate").await;
    seed_application(&state.pool, job, c1, "submitted", Utc::now()).await;

    assert_eq!(state.review_service.build_queue(reviewer).await.unwrap(), 0);
}

#[tokio::test]
async fn employee_queue_is_oldest_application_first() {
    let state = test_state().await;
    let reviewer = seed_user(&state.pool, "Rae Reviewer", "employee").await;
    let job = seed_job(&state.pool, "Backend Engineer", &["python"], &[], true).await;
    assign_employee(&state.pool, job, reviewer, "accepted").await;

    let now = Utc::now();
    let c1 = seed_user(&state.pool, "Late Candidate", "candidate").await;
    let c2 = seed_user(&state.pool, "Early Candidate", "candidate").await;
    let late = seed_application(&state.pool, job, c1, "employee_review", now).await;
    let early =
        seed_application(&state.pool, job, c2, "employee_review", now - Duration::hours(2)).await;

    state.review_service.build_queue(reviewer).await.unwrap();
    let queue = state.review_service.employee_queue(reviewer).await.unwrap();
    assert_eq!(queue[0].application_id, early);
    assert_eq!(queue[1].application_id, late);
}

async fn queue_with_one_assignment(state: &hireflow::AppState) -> (i64, i64, i64, i64) {
    let reviewer = seed_user(&state.pool, "Rae Reviewer", "employee").await;
    let job = seed_job(&state.pool, "Backend Engineer", &["python"], &[], true).await;
    assign_employee(&state.pool, job, reviewer, "accepted").await;
    let candidate = seed_user(&state.pool, "One Candidate", "candidate").await;
    let app = seed_application(&state.pool, job, candidate, "employee_review", Utc::now()).await;
    state.review_service.build_queue(reviewer).await.unwrap();
    let queue = state.review_service.employee_queue(reviewer).await.unwrap();
    (reviewer, candidate, app, queue[0].assignment_id)
}

#[tokio::test]
async fn approve_advances_to_interview_pending() {
    let state = test_state().await;
    let (reviewer, candidate, app, assignment) = queue_with_one_assignment(&state).await;

    let decided = state
        .review_service
        .decide(
            reviewer,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Approve,
                notes: "Strong fit".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(decided.decision, Some(ReviewDecision::Approve));
    assert!(decided.decided_at.is_some());

    let stored = state.application_service.get(app).await.unwrap();
    assert_eq!(stored.stage, ApplicationStage::InterviewPending);

    let notes = notifications_for(&state.pool, candidate).await;
    assert_eq!(notes[0].0, "Approved for interview");
    assert_eq!(notes[0].1, format!("/applications/{}/schedule", app));
}

#[tokio::test]
async fn reject_records_reason_and_links_to_job() {
    let state = test_state().await;
    let (reviewer, candidate, app, assignment) = queue_with_one_assignment(&state).await;

    state
        .review_service
        .decide(
            reviewer,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Reject,
                notes: "Not enough backend depth".into(),
            },
        )
        .await
        .unwrap();

    let stored = state.application_service.get(app).await.unwrap();
    assert_eq!(stored.stage, ApplicationStage::Rejected);
    assert_eq!(stored.rejection_reason, "Not enough backend depth");

    let notes = notifications_for(&state.pool, candidate).await;
    assert_eq!(notes[0].0, "Application update");
    assert!(notes[0].1.starts_with("/jobs/"));
}

#[tokio::test]
async fn reject_without_notes_uses_default_reason() {
    let state = test_state().await;
    let (reviewer, _candidate, app, assignment) = queue_with_one_assignment(&state).await;

    state
        .review_service
        .decide(
            reviewer,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Reject,
                notes: "   ".into(),
            },
        )
        .await
        .unwrap();

    let stored = state.application_service.get(app).await.unwrap();
    assert_eq!(stored.rejection_reason, "Rejected by reviewer.");
}

#[tokio::test]
async fn a_decision_is_immutable() {
    let state = test_state().await;
    let (reviewer, _candidate, app, assignment) = queue_with_one_assignment(&state).await;

    state
        .review_service
        .decide(
            reviewer,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Approve,
                notes: String::new(),
            },
        )
        .await
        .unwrap();

    let err = state
        .review_service
        .decide(
            reviewer,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Reject,
                notes: "changed my mind".into(),
            },
        )
        .await
        .expect_err("second decision");
    assert!(matches!(err, Error::AlreadyDecided));

    // The original decision and the stage it drove are untouched.
    let decision: String =
        sqlx::query_scalar(r#"SELECT decision FROM review_assignments WHERE id = ?"#)
            .bind(assignment)
            .fetch_one(&state.pool)
            .await
            .unwrap();
    assert_eq!(decision, "approve");
    let stored = state.application_service.get(app).await.unwrap();
    assert_eq!(stored.stage, ApplicationStage::InterviewPending);
}

#[tokio::test]
async fn a_decision_survives_a_dead_notification_channel() {
    let state = test_state().await;
    let (reviewer, _candidate, app, assignment) = queue_with_one_assignment(&state).await;
    sqlx::query(r#"DROP TABLE notifications"#)
        .execute(&state.pool)
        .await
        .unwrap();

    let decided = state
        .review_service
        .decide(
            reviewer,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Approve,
                notes: String::new(),
            },
        )
        .await
        .expect("the committed decision is returned regardless");
    assert_eq!(decided.decision, Some(ReviewDecision::Approve));

    let stored = state.application_service.get(app).await.unwrap();
    assert_eq!(stored.stage, ApplicationStage::InterviewPending);
}

#[tokio::test]
async fn deciding_someone_elses_assignment_reads_as_absent() {
    let state = test_state().await;
    let (_reviewer, _candidate, _app, assignment) = queue_with_one_assignment(&state).await;
    let outsider = seed_user(&state.pool, "Out Sider", "employee").await;

    let err = state
        .review_service
        .decide(
            outsider,
            DecidePayload {
                assignment_id: assignment,
                decision: ReviewDecision::Approve,
                notes: String::new(),
            },
        )
        .await
        .expect_err("foreign assignment");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn first_approval_wins_for_fanned_out_reviews() {
    let state = test_state().await;
    let job = seed_job(&state.pool, "Backend Engineer", &["python"], &[], true).await;
    let r1 = seed_user(&state.pool, "First Reviewer", "employee").await;
    let r2 = seed_user(&state.pool, "Second Reviewer", "employee").await;
    assign_employee(&state.pool, job, r1, "accepted").await;
    assign_employee(&state.pool, job, r2, "accepted").await;
    let candidate = seed_user(&state.pool, "One Candidate", "candidate").await;
    let app = seed_application(&state.pool, job, candidate, "employee_review", Utc::now()).await;

    state.review_service.build_queue(r1).await.unwrap();
    state.review_service.build_queue(r2).await.unwrap();
    let q1 = state.review_service.employee_queue(r1).await.unwrap();
    let q2 = state.review_service.employee_queue(r2).await.unwrap();

    state
        .review_service
        .decide(
            r1,
            DecidePayload {
                assignment_id: q1[0].assignment_id,
                decision: ReviewDecision::Approve,
                notes: String::new(),
            },
        )
        .await
        .unwrap();

    // The second reviewer can still record an opinion, but the stage was
    // already driven by the first decision.
    state
        .review_service
        .decide(
            r2,
            DecidePayload {
                assignment_id: q2[0].assignment_id,
                decision: ReviewDecision::Approve,
                notes: String::new(),
            },
        )
        .await
        .unwrap();

    let stored = state.application_service.get(app).await.unwrap();
    assert_eq!(stored.stage, ApplicationStage::InterviewPending);
}
