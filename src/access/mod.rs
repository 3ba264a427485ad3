//! Playback access-control gate
//!
//! Decides whether a playback request for (caller, course, lesson) may
//! receive a signed media URL. The decision itself is a pure function over
//! three facts — admin?, free lesson?, enrolled? — so the full table is
//! testable without any storage; the async wrapper only gathers the facts.
//!
//! A missing lesson and a lesson without attached media both surface as the
//! same not-found error: the caller must not learn which case occurred.

use bson::oid::ObjectId;
use tracing::debug;

use crate::auth::Caller;
use crate::db::schemas::{CourseDoc, EnrollmentDoc, COURSE_COLLECTION, ENROLLMENT_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{LearngateError, Result};
use bson::doc;

/// Pure playback decision.
///
/// | caller   | free lesson | enrolled | result |
/// |----------|-------------|----------|--------|
/// | admin    | any         | any      | allow  |
/// | other    | yes         | any      | allow  |
/// | other    | no          | yes      | allow  |
/// | other    | no          | no       | deny   |
pub fn playback_allowed(is_admin: bool, lesson_is_free: bool, is_enrolled: bool) -> bool {
    is_admin || lesson_is_free || is_enrolled
}

/// The gate component
#[derive(Clone)]
pub struct PlaybackGate {
    courses: MongoCollection<CourseDoc>,
    enrollments: MongoCollection<EnrollmentDoc>,
}

impl PlaybackGate {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            courses: mongo.collection::<CourseDoc>(COURSE_COLLECTION).await?,
            enrollments: mongo
                .collection::<EnrollmentDoc>(ENROLLMENT_COLLECTION)
                .await?,
        })
    }

    /// Authorize playback and return the lesson's media reference.
    ///
    /// Resolution order: course (404 if absent), lesson within the course in
    /// stored module/lesson order (404 if absent or without media), then the
    /// decision table. Enrollment is only consulted when the cheaper checks
    /// do not already allow.
    pub async fn authorize_playback(
        &self,
        caller: &Caller,
        course_id: ObjectId,
        lesson_id: ObjectId,
    ) -> Result<String> {
        let course = self
            .courses
            .find_one(doc! { "_id": course_id })
            .await?
            .ok_or_else(|| LearngateError::NotFound("Course not found".into()))?;

        let lesson = course
            .find_lesson(&lesson_id)
            .ok_or_else(|| LearngateError::NotFound("Video not found for this lesson".into()))?;

        // Indistinguishable from a missing lesson, by design
        let media_id = lesson
            .media_id
            .clone()
            .ok_or_else(|| LearngateError::NotFound("Video not found for this lesson".into()))?;

        let is_admin = caller.is_admin();
        let is_free = lesson.is_free;

        let is_enrolled = if is_admin || is_free {
            false // not consulted
        } else {
            self.enrollments
                .find_one(doc! { "account": caller.account_id, "course": course_id })
                .await?
                .is_some()
        };

        if !playback_allowed(is_admin, is_free, is_enrolled) {
            debug!(
                "Playback denied for account {} on lesson {} of course {}",
                caller.account_id, lesson_id, course_id
            );
            return Err(LearngateError::Forbidden(
                "You must be enrolled to access this video".into(),
            ));
        }

        Ok(media_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_always_allowed() {
        // admin x {free, gated} x {enrolled, not}
        assert!(playback_allowed(true, true, true));
        assert!(playback_allowed(true, true, false));
        assert!(playback_allowed(true, false, true));
        assert!(playback_allowed(true, false, false));
    }

    #[test]
    fn test_free_lesson_allowed_for_anyone() {
        assert!(playback_allowed(false, true, false));
        assert!(playback_allowed(false, true, true));
    }

    #[test]
    fn test_gated_lesson_requires_enrollment() {
        assert!(playback_allowed(false, false, true));
        assert!(!playback_allowed(false, false, false));
    }
}
