//! Enrollment ledger
//!
//! Owns creation and mutation of enrollment records. Two invariants are
//! load-bearing:
//!
//! - at most one enrollment per (account, course) pair, enforced by the
//!   collection's unique compound index so concurrent enroll calls cannot
//!   both succeed — the loser of the race sees the same "already enrolled"
//!   conflict as a plain duplicate attempt;
//! - the persisted (completed set, progress, is_completed) triple is always
//!   mutually consistent: progress updates are compare-and-set against the
//!   stored `revision` and retried on conflict rather than blindly
//!   overwritten.

use bson::{doc, oid::ObjectId};
use tracing::{info, warn};

use crate::auth::Caller;
use crate::db::schemas::{CourseDoc, EnrollmentDoc, COURSE_COLLECTION, ENROLLMENT_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{LearngateError, Result};

/// Attempts before a contended progress update gives up
const MAX_UPDATE_RETRIES: usize = 3;

/// The ledger component
#[derive(Clone)]
pub struct EnrollmentLedger {
    enrollments: MongoCollection<EnrollmentDoc>,
    courses: MongoCollection<CourseDoc>,
}

impl EnrollmentLedger {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            enrollments: mongo
                .collection::<EnrollmentDoc>(ENROLLMENT_COLLECTION)
                .await?,
            courses: mongo.collection::<CourseDoc>(COURSE_COLLECTION).await?,
        })
    }

    /// Share the underlying collection with other components
    pub fn collection(&self) -> MongoCollection<EnrollmentDoc> {
        self.enrollments.clone()
    }

    /// Enroll the caller in a course.
    ///
    /// The existence check gives a friendly error for the common case; the
    /// unique index is what actually guarantees one record per pair when two
    /// enroll calls race. Either path surfaces the same conflict error.
    pub async fn enroll(&self, caller: &Caller, course_id: ObjectId) -> Result<EnrollmentDoc> {
        // The course must exist before a relationship to it can
        self.courses
            .find_one(doc! { "_id": course_id })
            .await?
            .ok_or_else(|| LearngateError::NotFound("No course with that ID".into()))?;

        let existing = self
            .enrollments
            .find_one(doc! { "account": caller.account_id, "course": course_id })
            .await?;
        if existing.is_some() {
            return Err(LearngateError::Conflict("Already enrolled".into()));
        }

        let mut enrollment = EnrollmentDoc::new(caller.account_id, course_id);

        match self.enrollments.insert_one(enrollment.clone()).await {
            Ok(id) => {
                enrollment.id = Some(id);
                info!(
                    "Enrolled account {} in course {}",
                    caller.account_id, course_id
                );
                Ok(enrollment)
            }
            // Lost a race with a concurrent enroll for the same pair
            Err(LearngateError::Conflict(_)) => {
                Err(LearngateError::Conflict("Already enrolled".into()))
            }
            Err(other) => Err(other),
        }
    }

    /// Mark or un-mark a lesson as completed and recompute progress.
    ///
    /// The mutation is read-modify-write: load the enrollment, apply the set
    /// operation, recompute against the course's live lesson count, then
    /// persist conditionally on the revision observed at read time. A
    /// concurrent writer bumps the revision and fails our condition, in
    /// which case the whole cycle is retried from a fresh read.
    ///
    /// The lesson id is deliberately not validated against the course's
    /// curriculum — un-marking a stale id after a curriculum change must
    /// stay possible.
    pub async fn set_lesson_completion(
        &self,
        caller: &Caller,
        course_id: ObjectId,
        lesson_id: ObjectId,
        completed: bool,
    ) -> Result<EnrollmentDoc> {
        for attempt in 0..MAX_UPDATE_RETRIES {
            let mut enrollment = self
                .enrollments
                .find_one(doc! { "account": caller.account_id, "course": course_id })
                .await?
                .ok_or_else(|| LearngateError::NotFound("Not enrolled in this course".into()))?;

            let observed_revision = enrollment.revision;

            enrollment.set_lesson_completion(lesson_id, completed);

            let course = self
                .courses
                .find_one(doc! { "_id": course_id })
                .await?
                .ok_or_else(|| LearngateError::NotFound("No course with that ID".into()))?;

            enrollment.recompute_progress(course.total_lessons());
            enrollment.revision = observed_revision + 1;

            let completed_ids: Vec<ObjectId> = enrollment.completed_lessons.clone();
            let result = self
                .enrollments
                .update_one(
                    doc! {
                        "account": caller.account_id,
                        "course": course_id,
                        "revision": observed_revision,
                    },
                    doc! {
                        "$set": {
                            "completedLessons": completed_ids,
                            "progress": enrollment.progress,
                            "isCompleted": enrollment.is_completed,
                            "revision": enrollment.revision,
                        }
                    },
                )
                .await?;

            if result.modified_count == 1 || result.matched_count == 1 {
                return Ok(enrollment);
            }

            warn!(
                "Progress update conflict for account {} course {} (attempt {})",
                caller.account_id,
                course_id,
                attempt + 1
            );
        }

        Err(LearngateError::Conflict(
            "Progress update contention, please retry".into(),
        ))
    }

    /// All enrollments for the caller, each with its course resolved.
    ///
    /// Order is storage order — callers display these as a collection and
    /// must not rely on it. A course deleted from the catalog resolves to
    /// `None` rather than poisoning the listing.
    pub async fn list_for_account(
        &self,
        caller: &Caller,
    ) -> Result<Vec<(EnrollmentDoc, Option<CourseDoc>)>> {
        let enrollments = self
            .enrollments
            .find_many(doc! { "account": caller.account_id })
            .await?;

        let mut resolved = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = self
                .courses
                .find_one(doc! { "_id": enrollment.course })
                .await?;
            resolved.push((enrollment, course));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    // The ledger's pure invariants (set semantics, recomputation, bounds,
    // the 6-lesson scenario) are covered in db::schemas::enrollment.
    // End-to-end enroll/update paths run against a live MongoDB in
    // tests/enrollment_ledger.rs (ignored unless one is available).
}
