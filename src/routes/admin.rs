//! Admin reporting routes
//!
//! - GET /api/admin/users       - All accounts
//! - GET /api/admin/enrollments - All enrollments with account/course resolved
//! - GET /api/admin/reports     - Aggregate marketplace numbers

use bson::{doc, DateTime};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{require_admin, resolve_caller};
use crate::routes::auth_routes::AccountResponse;
use crate::routes::respond::{
    cors_preflight, error_response, success, success_list, BoxBody,
};
use crate::server::AppState;
use crate::types::{LearngateError, Result};

/// Enrollment row for the admin table, with both references resolved.
/// Deleted accounts or courses resolve to null rather than hiding the row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEnrollmentView {
    pub id: String,
    pub account: Option<AccountResponse>,
    pub course_title: Option<String>,
    pub progress: i32,
    pub is_completed: bool,
    pub enrolled_at: DateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReport {
    pub total_users: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
    pub completed_enrollments: u64,
    /// Percentage of enrollments at 100%, rounded to one decimal
    pub completion_rate: f64,
}

/// GET /api/admin/users
async fn handle_users(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    require_admin(resolve_caller(&req, &state.jwt))?;

    let accounts = state.accounts.find_many(doc! {}).await?;
    let views: Vec<AccountResponse> = accounts.iter().map(AccountResponse::from).collect();

    Ok(success_list(StatusCode::OK, &views))
}

/// GET /api/admin/enrollments
async fn handle_enrollments(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    require_admin(resolve_caller(&req, &state.jwt))?;

    let enrollments = state.ledger.collection().find_many(doc! {}).await?;
    let courses = state.catalog.collection();

    let mut views = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let account = state
            .accounts
            .find_one(doc! { "_id": enrollment.account })
            .await?;
        let course = courses.find_one(doc! { "_id": enrollment.course }).await?;

        views.push(AdminEnrollmentView {
            id: enrollment.id.map(|id| id.to_hex()).unwrap_or_default(),
            account: account.as_ref().map(AccountResponse::from),
            course_title: course.map(|c| c.title),
            progress: enrollment.progress,
            is_completed: enrollment.is_completed,
            enrolled_at: enrollment.enrolled_at,
        });
    }

    Ok(success_list(StatusCode::OK, &views))
}

/// GET /api/admin/reports
async fn handle_reports(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    require_admin(resolve_caller(&req, &state.jwt))?;

    let total_users = state.accounts.count(doc! {}).await?;
    let total_courses = state.catalog.collection().count(doc! {}).await?;
    let enrollments = state.ledger.collection();
    let total_enrollments = enrollments.count(doc! {}).await?;
    let completed_enrollments = enrollments.count(doc! { "isCompleted": true }).await?;

    let completion_rate = if total_enrollments > 0 {
        (completed_enrollments as f64 / total_enrollments as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(success(
        StatusCode::OK,
        &AdminReport {
            total_users,
            total_courses,
            total_enrollments,
            completed_enrollments,
            completion_rate,
        },
    ))
}

/// Handle admin HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not an admin
/// route.
pub async fn handle_admin_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if !path.starts_with("/api/admin") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/api/admin/users") => handle_users(req, state).await,
        (&Method::GET, "/api/admin/enrollments") => handle_enrollments(req, state).await,
        (&Method::GET, "/api/admin/reports") => handle_reports(req, state).await,
        _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
    };

    Some(response.unwrap_or_else(error_response))
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_completion_rate_rounds_to_one_decimal() {
        let rate = |completed: u64, total: u64| -> f64 {
            if total > 0 {
                (completed as f64 / total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            }
        };

        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 3), 33.3);
        assert_eq!(rate(2, 3), 66.7);
        assert_eq!(rate(3, 3), 100.0);
    }
}
