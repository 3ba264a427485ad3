//! Course document schema
//!
//! A course is an aggregate: it exclusively owns its modules, which
//! exclusively own their lessons. Nothing outside the catalog mutates a
//! lesson except by replacing it through the owning course. Module and
//! lesson ids are assigned once and stay stable for the life of the
//! course — enrollment progress keys off them.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for courses
pub const COURSE_COLLECTION: &str = "courses";

/// Difficulty level of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Parse from a query-string value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Content kind of a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    #[default]
    Video,
    Text,
}

/// A single lesson inside a module
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub title: String,

    #[serde(default)]
    pub kind: LessonKind,

    /// Text body for text lessons, supplementary notes for video lessons
    #[serde(default)]
    pub content: String,

    /// CDN public id of the lesson video, if one has been attached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,

    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,

    /// Free-preview flag: playable without enrollment
    #[serde(default)]
    pub is_free: bool,
}

/// An ordered group of lessons inside a course
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub title: String,

    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Course document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CourseDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub title: String,

    /// URL-friendly identifier, unique across courses
    pub slug: String,

    pub description: String,

    pub price: f64,

    /// CDN public id of the thumbnail image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_media_id: Option<String>,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub level: CourseLevel,

    /// Owning instructor (account reference)
    pub instructor: ObjectId,

    #[serde(default)]
    pub modules: Vec<CourseModule>,

    #[serde(default)]
    pub is_published: bool,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_category() -> String {
    "general".to_string()
}

impl CourseDoc {
    /// Live lesson count across all modules
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Locate a lesson by id: modules in stored order, lessons within a
    /// module in stored order, first match wins. Lesson ids are assumed
    /// globally unique within a course.
    pub fn find_lesson(&self, lesson_id: &ObjectId) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| &l.id == lesson_id)
    }
}

impl IntoIndexes for CourseDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on slug
            (
                doc! { "slug": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("slug_unique".to_string())
                        .build(),
                ),
            ),
            // Text index for catalog search
            (
                doc! { "title": "text", "description": "text" },
                Some(
                    IndexOptions::builder()
                        .name("title_description_text".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(title: &str) -> Lesson {
        Lesson {
            id: ObjectId::new(),
            title: title.into(),
            kind: LessonKind::Video,
            content: String::new(),
            media_id: None,
            duration_seconds: None,
            is_free: false,
        }
    }

    fn course_with_modules(modules: Vec<CourseModule>) -> CourseDoc {
        let now = DateTime::now();
        CourseDoc {
            id: Some(ObjectId::new()),
            title: "Test Course".into(),
            slug: "test-course".into(),
            description: "A course used in tests".into(),
            price: 0.0,
            thumbnail_media_id: None,
            category: "general".into(),
            level: CourseLevel::Beginner,
            instructor: ObjectId::new(),
            modules,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_total_lessons_sums_across_modules() {
        let course = course_with_modules(vec![
            CourseModule {
                id: ObjectId::new(),
                title: "Basics".into(),
                lessons: vec![lesson("a"), lesson("b")],
            },
            CourseModule {
                id: ObjectId::new(),
                title: "Advanced".into(),
                lessons: vec![lesson("c")],
            },
        ]);

        assert_eq!(course.total_lessons(), 3);
    }

    #[test]
    fn test_total_lessons_empty_course() {
        let course = course_with_modules(vec![]);
        assert_eq!(course.total_lessons(), 0);
    }

    #[test]
    fn test_find_lesson_searches_all_modules() {
        let target = lesson("target");
        let target_id = target.id;

        let course = course_with_modules(vec![
            CourseModule {
                id: ObjectId::new(),
                title: "First".into(),
                lessons: vec![lesson("a")],
            },
            CourseModule {
                id: ObjectId::new(),
                title: "Second".into(),
                lessons: vec![lesson("b"), target],
            },
        ]);

        let found = course.find_lesson(&target_id).unwrap();
        assert_eq!(found.title, "target");

        assert!(course.find_lesson(&ObjectId::new()).is_none());
    }

    #[test]
    fn test_level_parse_rejects_unknown() {
        assert_eq!(CourseLevel::parse("beginner"), Some(CourseLevel::Beginner));
        assert_eq!(CourseLevel::parse("advanced"), Some(CourseLevel::Advanced));
        assert_eq!(CourseLevel::parse("ninja"), None);
        assert_eq!(CourseLevel::parse(""), None);
    }
}
