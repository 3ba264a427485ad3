//! HTTP server implementation
//!
//! hyper http1 with TokioIo; one task per connection, request-scoped
//! execution, no background tasks.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::catalog::CatalogStore;
use crate::config::Args;
use crate::db::schemas::{AccountDoc, ACCOUNT_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::enrollment::EnrollmentLedger;
use crate::media::{CloudinaryDelivery, MediaDelivery};
use crate::routes;
use crate::routes::respond::{cors_preflight, not_found, BoxBody};
use crate::access::PlaybackGate;
use crate::types::{LearngateError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub jwt: JwtValidator,
    pub accounts: MongoCollection<AccountDoc>,
    pub catalog: CatalogStore,
    pub ledger: EnrollmentLedger,
    pub gate: PlaybackGate,
    pub media: Arc<dyn MediaDelivery>,
}

impl AppState {
    /// Wire up all components against a connected MongoDB client.
    ///
    /// Collection handles apply their schema indexes here, so uniqueness
    /// constraints exist before the first request is served.
    pub async fn new(args: Args, mongo: MongoClient) -> Result<Self> {
        let jwt = match &args.jwt_secret {
            Some(secret) => JwtValidator::new(secret.clone(), args.jwt_expiry_seconds)?,
            None if args.dev_mode => JwtValidator::new_dev(),
            None => {
                return Err(LearngateError::Config(
                    "JWT_SECRET is required in production mode".into(),
                ))
            }
        };

        let media: Arc<dyn MediaDelivery> = Arc::new(CloudinaryDelivery::new(args.cdn.clone()));

        Ok(Self {
            jwt,
            accounts: mongo.collection::<AccountDoc>(ACCOUNT_COLLECTION).await?,
            catalog: CatalogStore::new(&mongo).await?,
            ledger: EnrollmentLedger::new(&mongo).await?,
            gate: PlaybackGate::new(&mongo).await?,
            media,
            args,
        })
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("LearnGate listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - insecure defaults in use");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // Prefix routers consume the request when they match
    if path.starts_with("/api/auth") {
        if let Some(response) = routes::handle_auth_request(req, state).await {
            return Ok(response);
        }
        return Ok(not_found(&path));
    }
    if path.starts_with("/api/courses") {
        if let Some(response) = routes::handle_course_request(req, state).await {
            return Ok(response);
        }
        return Ok(not_found(&path));
    }
    if path.starts_with("/api/enrollments") {
        if let Some(response) = routes::handle_enrollment_request(req, state).await {
            return Ok(response);
        }
        return Ok(not_found(&path));
    }
    if path.starts_with("/api/upload") {
        if let Some(response) = routes::handle_upload_request(req, state).await {
            return Ok(response);
        }
        return Ok(not_found(&path));
    }
    if path.starts_with("/api/admin") {
        if let Some(response) = routes::handle_admin_request(req, state).await {
            return Ok(response);
        }
        return Ok(not_found(&path));
    }

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") | (Method::GET, "/api/health") => {
            routes::health_check(&state.args)
        }
        (Method::GET, "/version") => routes::version_info(),
        (Method::OPTIONS, _) => cors_preflight(),
        _ => not_found(&path),
    };

    Ok(response)
}
