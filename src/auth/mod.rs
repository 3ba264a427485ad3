//! Authentication and authorization for LearnGate
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - Caller resolution and flat role checks (learner+/admin)

pub mod caller;
pub mod jwt;
pub mod password;

pub use caller::{require_admin, require_caller, resolve_caller, Caller};
pub use jwt::{extract_token_from_header, Claims, JwtValidator};
pub use password::{hash_password, verify_password};
