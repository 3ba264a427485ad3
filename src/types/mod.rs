//! Shared types for LearnGate

pub mod error;

pub use error::{LearngateError, Result};

use bson::oid::ObjectId;

/// Parse a caller-supplied identifier, naming the offending field on failure
pub fn parse_object_id(value: &str, field: &str) -> Result<ObjectId> {
    ObjectId::parse_str(value)
        .map_err(|_| LearngateError::Validation(format!("{} is not a valid identifier", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id_valid() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "courseId").unwrap(), id);
    }

    #[test]
    fn test_parse_object_id_invalid_names_field() {
        let err = parse_object_id("not-an-id", "courseId").unwrap_err();
        assert!(matches!(err, LearngateError::Validation(_)));
        assert!(err.to_string().contains("courseId"));
    }
}
