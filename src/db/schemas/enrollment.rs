//! Enrollment document schema
//!
//! The ledger record: one document per (account, course) pair, holding the
//! set of completed lesson ids and the derived progress percentage. The
//! pair uniqueness is enforced by a compound unique index, not by
//! application-level read-then-write, so concurrent enroll calls cannot
//! both succeed.
//!
//! Mutation happens in two pure steps (`set_lesson_completion`,
//! `recompute_progress`) so the invariants are testable without a running
//! MongoDB; the ledger persists the result with a conditional update keyed
//! on `revision`.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for enrollments
pub const ENROLLMENT_COLLECTION: &str = "enrollments";

/// Enrollment document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Enrolled account
    pub account: ObjectId,

    /// Enrolled course
    pub course: ObjectId,

    /// Completed lesson ids; membership semantics, insertion order irrelevant
    #[serde(default)]
    pub completed_lessons: Vec<ObjectId>,

    /// Derived percentage in [0, 100]
    #[serde(default)]
    pub progress: i32,

    /// True exactly when progress == 100 (while the course has lessons)
    #[serde(default)]
    pub is_completed: bool,

    pub enrolled_at: DateTime,

    /// Optimistic-concurrency counter, bumped on every persisted update
    #[serde(default)]
    pub revision: i64,
}

impl EnrollmentDoc {
    /// Fresh enrollment for a pair: empty set, zero progress
    pub fn new(account: ObjectId, course: ObjectId) -> Self {
        Self {
            id: None,
            account,
            course,
            completed_lessons: Vec::new(),
            progress: 0,
            is_completed: false,
            enrolled_at: DateTime::now(),
            revision: 0,
        }
    }

    /// Whether a lesson id is in the completed set
    pub fn has_completed(&self, lesson_id: &ObjectId) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    /// Add or remove a lesson id with set semantics.
    ///
    /// Re-marking a completed lesson and un-marking an absent one are both
    /// no-ops, not errors. Returns true if the set changed.
    pub fn set_lesson_completion(&mut self, lesson_id: ObjectId, completed: bool) -> bool {
        if completed {
            if self.has_completed(&lesson_id) {
                return false;
            }
            self.completed_lessons.push(lesson_id);
            true
        } else {
            let before = self.completed_lessons.len();
            self.completed_lessons.retain(|id| id != &lesson_id);
            self.completed_lessons.len() != before
        }
    }

    /// Recompute progress against the live lesson count.
    ///
    /// With zero lessons the previous progress and completion flag are left
    /// untouched: there is nothing meaningful to divide by, and forcing 0 or
    /// 100 would invent state.
    pub fn recompute_progress(&mut self, total_lessons: usize) {
        if total_lessons == 0 {
            return;
        }

        let completed = self.completed_lessons.len() as f64;
        self.progress = ((completed / total_lessons as f64) * 100.0).round() as i32;
        self.is_completed = self.progress == 100;
    }
}

impl IntoIndexes for EnrollmentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One enrollment per (account, course) pair
            (
                doc! { "account": 1, "course": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("account_course_unique".to_string())
                        .build(),
                ),
            ),
            // Lookups by account for the dashboard listing
            (
                doc! { "account": 1 },
                Some(
                    IndexOptions::builder()
                        .name("account_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment() -> EnrollmentDoc {
        EnrollmentDoc::new(ObjectId::new(), ObjectId::new())
    }

    #[test]
    fn test_fresh_enrollment_state() {
        let e = enrollment();
        assert!(e.completed_lessons.is_empty());
        assert_eq!(e.progress, 0);
        assert!(!e.is_completed);
        assert_eq!(e.revision, 0);
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut e = enrollment();
        let lesson = ObjectId::new();

        assert!(e.set_lesson_completion(lesson, true));
        e.recompute_progress(4);
        let after_once = (e.completed_lessons.clone(), e.progress);

        // Second identical call changes nothing
        assert!(!e.set_lesson_completion(lesson, true));
        e.recompute_progress(4);
        assert_eq!((e.completed_lessons.clone(), e.progress), after_once);
        assert_eq!(e.completed_lessons.len(), 1);
    }

    #[test]
    fn test_unmarking_absent_lesson_is_noop() {
        let mut e = enrollment();
        assert!(!e.set_lesson_completion(ObjectId::new(), false));
        assert!(e.completed_lessons.is_empty());
    }

    #[test]
    fn test_six_lesson_scenario() {
        // 3 modules x 2 lessons = 6 total
        let lessons: Vec<ObjectId> = (0..6).map(|_| ObjectId::new()).collect();
        let mut e = enrollment();

        // Mark 3 distinct lessons -> 50%, not completed
        for lesson in &lessons[..3] {
            e.set_lesson_completion(*lesson, true);
        }
        e.recompute_progress(6);
        assert_eq!(e.progress, 50);
        assert!(!e.is_completed);

        // Mark the remaining 3 -> 100%, completed
        for lesson in &lessons[3..] {
            e.set_lesson_completion(*lesson, true);
        }
        e.recompute_progress(6);
        assert_eq!(e.progress, 100);
        assert!(e.is_completed);

        // Un-mark one -> round(100*5/6) == 83, not completed
        e.set_lesson_completion(lessons[0], false);
        e.recompute_progress(6);
        assert_eq!(e.progress, 83);
        assert!(!e.is_completed);
    }

    #[test]
    fn test_progress_monotonic_under_pure_completion() {
        let lessons: Vec<ObjectId> = (0..7).map(|_| ObjectId::new()).collect();
        let mut e = enrollment();
        let mut last = 0;

        for lesson in &lessons {
            e.set_lesson_completion(*lesson, true);
            e.recompute_progress(lessons.len());
            assert!(e.progress >= last);
            last = e.progress;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_progress_bounds_and_completed_flag() {
        let lessons: Vec<ObjectId> = (0..5).map(|_| ObjectId::new()).collect();
        let mut e = enrollment();

        for lesson in &lessons {
            e.set_lesson_completion(*lesson, true);
            e.recompute_progress(lessons.len());
            assert!((0..=100).contains(&e.progress));
            assert_eq!(e.is_completed, e.progress == 100);
        }
    }

    #[test]
    fn test_zero_lessons_leaves_progress_unchanged() {
        let mut e = enrollment();
        e.set_lesson_completion(ObjectId::new(), true);
        e.progress = 42;
        e.is_completed = false;

        // No arithmetic error, no forced 0 or 100
        e.recompute_progress(0);
        assert_eq!(e.progress, 42);
        assert!(!e.is_completed);
    }

    #[test]
    fn test_curriculum_growth_recomputes_against_live_count() {
        let mut e = enrollment();
        let lesson = ObjectId::new();
        e.set_lesson_completion(lesson, true);

        // Course had 2 lessons at first recompute
        e.recompute_progress(2);
        assert_eq!(e.progress, 50);

        // Curriculum grew to 4 lessons; next recompute uses the live count
        e.recompute_progress(4);
        assert_eq!(e.progress, 25);
    }
}
