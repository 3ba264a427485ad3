//! Database schemas for LearnGate
//!
//! Document structures for accounts, courses, and enrollments. Each schema
//! declares its own indexes via `IntoIndexes`; the uniqueness constraints
//! (account email, course slug, enrollment pair) live here next to the
//! types they protect.

pub mod account;
pub mod course;
pub mod enrollment;

pub use account::{AccountDoc, Role, ACCOUNT_COLLECTION};
pub use course::{CourseDoc, CourseLevel, CourseModule, Lesson, LessonKind, COURSE_COLLECTION};
pub use enrollment::{EnrollmentDoc, ENROLLMENT_COLLECTION};
