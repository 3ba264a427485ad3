//! HTTP routes for authentication
//!
//! - POST /api/auth/register - Create an account and get a JWT token
//! - POST /api/auth/login    - Authenticate and get a JWT token
//! - POST /api/auth/logout   - Stateless logout (client discards the token)
//! - GET  /api/auth/me       - Current account info from the token

use bson::doc;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{hash_password, require_caller, resolve_caller, verify_password};
use crate::db::schemas::{AccountDoc, Role};
use crate::routes::respond::{
    cors_preflight, error_response, parse_json_body, success, BoxBody,
};
use crate::server::AppState;
use crate::types::{LearngateError, Result};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account as exposed over the wire. The password hash never leaves the
/// identity store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_media_id: Option<String>,
}

impl From<&AccountDoc> for AccountResponse {
    fn from(account: &AccountDoc) -> Self {
        Self {
            id: account.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            avatar_media_id: account.avatar_media_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: u64,
    pub account: AccountResponse,
}

impl RegisterRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LearngateError::Validation("name is required".into()));
        }
        if !self.email.contains('@') {
            return Err(LearngateError::Validation(
                "email is not a valid address".into(),
            ));
        }
        if self.password.len() < 8 {
            return Err(LearngateError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        Ok(())
    }
}

/// POST /api/auth/register
///
/// The email-exists pre-check gives a friendly message; the unique index on
/// email is what holds when two registrations race.
async fn handle_register(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let body: RegisterRequest = parse_json_body(req).await?;
    body.validate()?;

    let email = body.email.trim().to_lowercase();

    if state.accounts.find_one(doc! { "email": &email }).await?.is_some() {
        return Err(LearngateError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let password_hash = hash_password(&body.password)?;
    let mut account = AccountDoc::new(
        body.name.trim().to_string(),
        email.clone(),
        password_hash,
        Role::Learner,
    );

    let id = state
        .accounts
        .insert_one(account.clone())
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration for the same email
            LearngateError::Conflict(_) => {
                LearngateError::Conflict("An account with this email already exists".into())
            }
            other => other,
        })?;
    account.id = Some(id);

    info!("Registered account {}", email);

    auth_success(&state, &account, StatusCode::CREATED)
}

/// POST /api/auth/login
///
/// Missing account and wrong password are indistinguishable to the caller,
/// preventing email enumeration.
async fn handle_login(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let body: LoginRequest = parse_json_body(req).await?;

    if body.email.is_empty() || body.password.is_empty() {
        return Err(LearngateError::Validation(
            "email and password are required".into(),
        ));
    }

    let email = body.email.trim().to_lowercase();

    let account = match state.accounts.find_one(doc! { "email": &email }).await? {
        Some(account) => account,
        None => {
            warn!("Login failed, no account for {}", email);
            return Err(LearngateError::Unauthenticated(
                "Invalid email or password".into(),
            ));
        }
    };

    if !verify_password(&body.password, &account.password_hash)? {
        warn!("Login failed, wrong password for {}", email);
        return Err(LearngateError::Unauthenticated(
            "Invalid email or password".into(),
        ));
    }

    info!("Login successful: {}", email);

    auth_success(&state, &account, StatusCode::OK)
}

/// POST /api/auth/logout
///
/// Tokens are stateless; logout is the client discarding its copy.
fn handle_logout() -> Response<BoxBody> {
    success(
        StatusCode::OK,
        &serde_json::json!({ "message": "Logged out successfully" }),
    )
}

/// GET /api/auth/me
async fn handle_me(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    let caller = require_caller(resolve_caller(&req, &state.jwt))?;

    let account = state
        .accounts
        .find_one(doc! { "_id": caller.account_id })
        .await?
        .ok_or_else(|| LearngateError::NotFound("Account not found".into()))?;

    Ok(success(StatusCode::OK, &AccountResponse::from(&account)))
}

fn auth_success(
    state: &AppState,
    account: &AccountDoc,
    status: StatusCode,
) -> Result<Response<BoxBody>> {
    let id = account
        .id
        .ok_or_else(|| LearngateError::Internal("Account has no id after insert".into()))?;

    let token = state
        .jwt
        .generate_token(&id.to_hex(), &account.email, account.role)?;

    Ok(success(
        status,
        &AuthResponse {
            token,
            expires_in: state.jwt.expiry_seconds(),
            account: AccountResponse::from(account),
        },
    ))
}

/// Handle auth-related HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not an auth
/// route.
pub async fn handle_auth_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if !path.starts_with("/api/auth") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    let response = match (&method, path.as_str()) {
        (&Method::POST, "/api/auth/register") => handle_register(req, state).await,
        (&Method::POST, "/api/auth/login") => handle_login(req, state).await,
        (&Method::POST, "/api/auth/logout") => Ok(handle_logout()),
        (&Method::GET, "/api/auth/me") => handle_me(req, state).await,
        _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
    };

    Some(response.unwrap_or_else(error_response))
}
