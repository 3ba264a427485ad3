//! HTTP server for LearnGate

pub mod http;

pub use http::{run, AppState};
