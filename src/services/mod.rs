pub mod application_service;
pub mod interview_service;
pub mod notification_service;
pub mod review_service;
pub mod scheduling_service;
pub mod scoring;
