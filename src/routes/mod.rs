//! HTTP routes for LearnGate

pub mod admin;
pub mod auth_routes;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod respond;
pub mod upload;

pub use admin::handle_admin_request;
pub use auth_routes::handle_auth_request;
pub use courses::handle_course_request;
pub use enrollments::handle_enrollment_request;
pub use health::{health_check, version_info};
pub use upload::handle_upload_request;
