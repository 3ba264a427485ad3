//! LearnGate - REST API for an e-learning marketplace
//!
//! Users browse and enroll in courses, admins author course content, and
//! lesson video is delivered through a third-party media CDN. The design
//! core is the enrollment ledger (completed-lesson set + derived progress)
//! and the playback access-control gate; HTTP routing, password hashing,
//! and the CDN adapter are collaborators around it.

pub mod access;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod enrollment;
pub mod media;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{LearngateError, Result};
