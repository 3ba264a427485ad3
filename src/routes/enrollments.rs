//! HTTP routes for the enrollment ledger
//!
//! - POST /api/enrollments                     - Enroll in a course
//! - GET  /api/enrollments/me                  - Caller's enrollments with courses
//! - PUT  /api/enrollments/:courseId/progress  - Mark/un-mark a lesson

use bson::DateTime;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{require_caller, resolve_caller};
use crate::db::schemas::{CourseDoc, EnrollmentDoc};
use crate::routes::respond::{
    cors_preflight, error_response, parse_json_body, success, success_list, BoxBody,
};
use crate::server::AppState;
use crate::types::{parse_object_id, LearngateError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub lesson_id: String,
    /// Marking is the common case; send false to un-mark
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

/// Enrollment as every enrollment endpoint returns it: ids as plain hex
/// strings, the raw course reference replaced by the full document (or null
/// when the course has since been deleted).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub id: String,
    pub course: Option<CourseDoc>,
    pub completed_lessons: Vec<String>,
    pub progress: i32,
    pub is_completed: bool,
    pub enrolled_at: DateTime,
}

impl EnrollmentView {
    fn new(enrollment: EnrollmentDoc, course: Option<CourseDoc>) -> Self {
        Self {
            id: enrollment.id.map(|id| id.to_hex()).unwrap_or_default(),
            course,
            completed_lessons: enrollment
                .completed_lessons
                .iter()
                .map(|id| id.to_hex())
                .collect(),
            progress: enrollment.progress,
            is_completed: enrollment.is_completed,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

/// POST /api/enrollments
async fn handle_enroll(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let caller = require_caller(resolve_caller(&req, &state.jwt))?;
    let body: EnrollRequest = parse_json_body(req).await?;
    let course_id = parse_object_id(&body.course_id, "courseId")?;

    let enrollment = state.ledger.enroll(&caller, course_id).await?;
    let course = state.catalog.get(&course_id).await?;

    Ok(success(
        StatusCode::CREATED,
        &EnrollmentView::new(enrollment, course),
    ))
}

/// GET /api/enrollments/me
async fn handle_list_mine(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let caller = require_caller(resolve_caller(&req, &state.jwt))?;

    let views: Vec<EnrollmentView> = state
        .ledger
        .list_for_account(&caller)
        .await?
        .into_iter()
        .map(|(enrollment, course)| EnrollmentView::new(enrollment, course))
        .collect();

    Ok(success_list(StatusCode::OK, &views))
}

/// PUT /api/enrollments/:courseId/progress
async fn handle_progress(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    course_id: &str,
) -> Result<Response<BoxBody>> {
    let caller = require_caller(resolve_caller(&req, &state.jwt))?;
    let course_id = parse_object_id(course_id, "courseId")?;

    let body: ProgressRequest = parse_json_body(req).await?;
    let lesson_id = parse_object_id(&body.lesson_id, "lessonId")?;

    let enrollment = state
        .ledger
        .set_lesson_completion(&caller, course_id, lesson_id, body.completed)
        .await?;
    let course = state.catalog.get(&course_id).await?;

    Ok(success(StatusCode::OK, &EnrollmentView::new(enrollment, course)))
}

/// Handle enrollment HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not an
/// enrollment route.
pub async fn handle_enrollment_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if !path.starts_with("/api/enrollments") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    let tail = path.strip_prefix("/api/enrollments").unwrap_or("");

    let response = match (&method, tail) {
        (&Method::POST, "") => handle_enroll(req, state).await,
        (&Method::GET, "/me") => handle_list_mine(req, state).await,
        (&Method::PUT, t) => match t.strip_prefix('/').and_then(|t| t.strip_suffix("/progress")) {
            Some(course_id) if !course_id.is_empty() => {
                handle_progress(req, state, course_id).await
            }
            _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
        },
        _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
    };

    Some(response.unwrap_or_else(error_response))
}
