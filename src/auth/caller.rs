//! Authenticated caller resolution
//!
//! The caller is an explicit value handed into every core operation —
//! never an ambient lookup — which keeps the ledger and the access gate
//! independently testable. Anonymous requests resolve to `None`.

use bson::oid::ObjectId;
use hyper::Request;

use crate::auth::jwt::{extract_token_from_header, JwtValidator};
use crate::db::schemas::Role;
use crate::types::{LearngateError, Result};

/// Identity of the current request's caller
#[derive(Debug, Clone)]
pub struct Caller {
    pub account_id: ObjectId,
    pub email: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Resolve the caller from the Authorization header, if any.
///
/// An absent or invalid token yields `None` — endpoints that require a
/// caller escalate via [`require_caller`].
pub fn resolve_caller<B>(req: &Request<B>, jwt: &JwtValidator) -> Option<Caller> {
    let header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = extract_token_from_header(header)?;
    let claims = jwt.verify_token(token).ok()?;
    let account_id = ObjectId::parse_str(&claims.sub).ok()?;

    Some(Caller {
        account_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Require an authenticated caller (401 otherwise)
pub fn require_caller(caller: Option<Caller>) -> Result<Caller> {
    caller.ok_or_else(|| LearngateError::Unauthenticated("Not logged in".into()))
}

/// Require an authenticated admin (401 if anonymous, 403 otherwise)
pub fn require_admin(caller: Option<Caller>) -> Result<Caller> {
    let caller = require_caller(caller)?;
    if !caller.is_admin() {
        return Err(LearngateError::Forbidden(
            "Access denied. Admin only.".into(),
        ));
    }
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller_with_role(role: Role) -> Caller {
        Caller {
            account_id: ObjectId::new(),
            email: "someone@example.com".into(),
            role,
        }
    }

    #[test]
    fn test_require_caller_rejects_anonymous() {
        let err = require_caller(None).unwrap_err();
        assert!(matches!(err, LearngateError::Unauthenticated(_)));
    }

    #[test]
    fn test_require_admin_rejects_learner() {
        let err = require_admin(Some(caller_with_role(Role::Learner))).unwrap_err();
        assert!(matches!(err, LearngateError::Forbidden(_)));
    }

    #[test]
    fn test_require_admin_rejects_instructor() {
        let err = require_admin(Some(caller_with_role(Role::Instructor))).unwrap_err();
        assert!(matches!(err, LearngateError::Forbidden(_)));
    }

    #[test]
    fn test_require_admin_accepts_admin() {
        let caller = require_admin(Some(caller_with_role(Role::Admin))).unwrap();
        assert!(caller.is_admin());
    }

    #[test]
    fn test_resolve_caller_from_bearer_header() {
        let jwt = JwtValidator::new_dev();
        let account_id = ObjectId::new();
        let token = jwt
            .generate_token(&account_id.to_hex(), "a@b.c", Role::Learner)
            .unwrap();

        let req = Request::builder()
            .header("Authorization", format!("Bearer {}", token))
            .body(())
            .unwrap();

        let caller = resolve_caller(&req, &jwt).unwrap();
        assert_eq!(caller.account_id, account_id);
        assert_eq!(caller.role, Role::Learner);
    }

    #[test]
    fn test_resolve_caller_garbage_token_is_anonymous() {
        let jwt = JwtValidator::new_dev();
        let req = Request::builder()
            .header("Authorization", "Bearer not-a-token")
            .body(())
            .unwrap();

        assert!(resolve_caller(&req, &jwt).is_none());
    }

    #[test]
    fn test_resolve_caller_no_header_is_anonymous() {
        let jwt = JwtValidator::new_dev();
        let req = Request::builder().body(()).unwrap();
        assert!(resolve_caller(&req, &jwt).is_none());
    }
}
