//! HTTP routes for the course catalog
//!
//! - GET    /api/courses     - Public filtered listing
//! - GET    /api/courses/:id - Public course detail
//! - POST   /api/courses     - Create a course (admin)
//! - PUT    /api/courses/:id - Update a course (admin)
//! - DELETE /api/courses/:id - Delete a course (admin)

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::auth::{require_admin, resolve_caller};
use crate::catalog::{CourseFilter, CourseInput, CourseUpdate};
use crate::routes::respond::{
    cors_preflight, empty, error_response, parse_json_body, success, success_list, BoxBody,
};
use crate::server::AppState;
use crate::types::{parse_object_id, LearngateError, Result};

/// GET /api/courses
async fn handle_list(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let filter = CourseFilter::from_query(req.uri().query())?;
    let courses = state.catalog.list(&filter).await?;
    Ok(success_list(StatusCode::OK, &courses))
}

/// GET /api/courses/:id
async fn handle_get(state: Arc<AppState>, id: &str) -> Result<Response<BoxBody>> {
    let course_id = parse_object_id(id, "courseId")?;
    let course = state.catalog.get_required(&course_id).await?;
    Ok(success(StatusCode::OK, &course))
}

/// POST /api/courses
async fn handle_create(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let caller = require_admin(resolve_caller(&req, &state.jwt))?;
    let input: CourseInput = parse_json_body(req).await?;

    let course = state.catalog.create(input, caller.account_id).await?;
    Ok(success(StatusCode::CREATED, &course))
}

/// PUT /api/courses/:id
async fn handle_update(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    require_admin(resolve_caller(&req, &state.jwt))?;
    let course_id = parse_object_id(id, "courseId")?;
    let update: CourseUpdate = parse_json_body(req).await?;

    let course = state.catalog.update(&course_id, update).await?;
    Ok(success(StatusCode::OK, &course))
}

/// DELETE /api/courses/:id
async fn handle_delete(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Result<Response<BoxBody>> {
    require_admin(resolve_caller(&req, &state.jwt))?;
    let course_id = parse_object_id(id, "courseId")?;

    state.catalog.delete(&course_id).await?;
    Ok(empty(StatusCode::NO_CONTENT))
}

/// Handle catalog HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not a course
/// route.
pub async fn handle_course_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if !path.starts_with("/api/courses") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    let tail = path.strip_prefix("/api/courses").unwrap_or("");
    let id = tail.strip_prefix('/').filter(|s| !s.is_empty());

    let response = match (&method, id) {
        (&Method::GET, None) => handle_list(req, state).await,
        (&Method::POST, None) => handle_create(req, state).await,
        (&Method::GET, Some(id)) => handle_get(state, id).await,
        (&Method::PUT, Some(id)) => handle_update(req, state, id).await,
        (&Method::DELETE, Some(id)) => handle_delete(req, state, id).await,
        _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
    };

    Some(response.unwrap_or_else(error_response))
}
