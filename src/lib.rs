pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;

use crate::services::{
    application_service::ApplicationService, interview_service::InterviewService,
    notification_service::NotificationService, review_service::ReviewService,
    scheduling_service::SchedulingService,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub notification_service: NotificationService,
    pub application_service: ApplicationService,
    pub review_service: ReviewService,
    pub scheduling_service: SchedulingService,
    pub interview_service: InterviewService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let notification_service = NotificationService::new(pool.clone());
        let application_service =
            ApplicationService::new(pool.clone(), notification_service.clone());
        let review_service = ReviewService::new(pool.clone(), notification_service.clone());
        let scheduling_service = SchedulingService::new(pool.clone(), notification_service.clone());
        let interview_service = InterviewService::new(pool.clone(), notification_service.clone());

        Self {
            pool,
            notification_service,
            application_service,
            review_service,
            scheduling_service,
            interview_service,
        }
    }
}
