//! Account document schema
//!
//! Stores marketplace users: learners, instructors, and admins.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::mongo::IntoIndexes;

/// Collection name for accounts
pub const ACCOUNT_COLLECTION: &str = "accounts";

/// Role assigned to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Learner,
    Instructor,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Learner => write!(f, "learner"),
            Role::Instructor => write!(f, "instructor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Account document stored in MongoDB
///
/// Field names are camelCase on the wire and in BSON, matching what the
/// SPA consumes.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccountDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Display name
    pub name: String,

    /// Email, unique across accounts
    pub email: String,

    /// Argon2 password hash
    pub password_hash: String,

    /// Assigned role
    #[serde(default)]
    pub role: Role,

    /// CDN public id of the avatar image, if uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_media_id: Option<String>,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl AccountDoc {
    /// Create a new account document
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            name,
            email,
            password_hash,
            role,
            avatar_media_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl IntoIndexes for AccountDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on email
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
