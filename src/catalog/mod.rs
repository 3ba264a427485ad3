//! Course catalog
//!
//! Owns course aggregates: public filtered listing and admin-side CRUD.
//! Query construction is an enumerated filter structure — named optional
//! fields, validated and bounded before they reach the driver. Caller
//! strings are never interpolated into query operators; the search term is
//! regex-escaped and everything else matches against a fixed allow-list.

pub mod filter;

use bson::{doc, oid::ObjectId, DateTime};
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::{
    CourseDoc, CourseLevel, CourseModule, Lesson, LessonKind, COURSE_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{LearngateError, Result};

pub use filter::CourseFilter;

/// Admin payload for creating a course
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub thumbnail_media_id: Option<String>,
    pub category: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub modules: Vec<ModuleInput>,
    #[serde(default)]
    pub is_published: bool,
}

/// Admin payload for updating a course; absent fields are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub thumbnail_media_id: Option<String>,
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub modules: Option<Vec<ModuleInput>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    /// Existing module id; omitted for new modules
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<LessonInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonInput {
    /// Existing lesson id; omitted for new lessons. Ids are stable once
    /// assigned — enrollment progress keys off them.
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub kind: LessonKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_id: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub is_free: bool,
}

impl CourseInput {
    /// Field-level validation, mirroring what the client promises
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().len() < 5 {
            return Err(LearngateError::Validation(
                "title must be at least 5 characters".into(),
            ));
        }
        if self.description.trim().len() < 20 {
            return Err(LearngateError::Validation(
                "description must be at least 20 characters".into(),
            ));
        }
        if self.price < 0.0 {
            return Err(LearngateError::Validation(
                "price cannot be negative".into(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(LearngateError::Validation("category is required".into()));
        }
        Ok(())
    }
}

/// Catalog store over the courses collection
#[derive(Clone)]
pub struct CatalogStore {
    courses: MongoCollection<CourseDoc>,
}

impl CatalogStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            courses: mongo.collection::<CourseDoc>(COURSE_COLLECTION).await?,
        })
    }

    /// Share the underlying collection with other components
    pub fn collection(&self) -> MongoCollection<CourseDoc> {
        self.courses.clone()
    }

    /// List courses matching the validated filter
    pub async fn list(&self, filter: &CourseFilter) -> Result<Vec<CourseDoc>> {
        self.courses
            .find_many_with_options(filter.to_document(), Some(filter.to_find_options()))
            .await
    }

    /// Fetch a course by id
    pub async fn get(&self, course_id: &ObjectId) -> Result<Option<CourseDoc>> {
        self.courses.find_one(doc! { "_id": course_id }).await
    }

    /// Fetch a course by id, failing with not-found when absent
    pub async fn get_required(&self, course_id: &ObjectId) -> Result<CourseDoc> {
        self.get(course_id)
            .await?
            .ok_or_else(|| LearngateError::NotFound("No course with that ID".into()))
    }

    /// Create a course owned by the given instructor
    pub async fn create(&self, input: CourseInput, instructor: ObjectId) -> Result<CourseDoc> {
        input.validate()?;

        let now = DateTime::now();
        let mut course = CourseDoc {
            id: None,
            slug: slugify(&input.title),
            title: input.title,
            description: input.description,
            price: input.price,
            thumbnail_media_id: input.thumbnail_media_id,
            category: input.category,
            level: input.level,
            instructor,
            modules: materialize_modules(input.modules),
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        };

        let id = self.courses.insert_one(course.clone()).await.map_err(|e| {
            match e {
                // Slug collision; the timestamp suffix makes this effectively unreachable
                LearngateError::Conflict(_) => {
                    LearngateError::Conflict("A course with that slug already exists".into())
                }
                other => other,
            }
        })?;

        course.id = Some(id);
        info!("Created course {} ({})", course.slug, id);
        Ok(course)
    }

    /// Apply a partial update, returning the updated course
    pub async fn update(&self, course_id: &ObjectId, update: CourseUpdate) -> Result<CourseDoc> {
        let mut course = self.get_required(course_id).await?;

        if let Some(title) = update.title {
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(price) = update.price {
            if price < 0.0 {
                return Err(LearngateError::Validation(
                    "price cannot be negative".into(),
                ));
            }
            course.price = price;
        }
        if let Some(thumbnail) = update.thumbnail_media_id {
            course.thumbnail_media_id = Some(thumbnail);
        }
        if let Some(category) = update.category {
            course.category = category;
        }
        if let Some(level) = update.level {
            course.level = level;
        }
        if let Some(modules) = update.modules {
            // Client-supplied ids survive the round trip; new entries get fresh ids
            course.modules = materialize_modules(modules);
        }
        if let Some(is_published) = update.is_published {
            course.is_published = is_published;
        }
        course.updated_at = DateTime::now();

        let mut serialized = bson::to_document(&course)
            .map_err(|e| LearngateError::Internal(format!("Failed to serialize course: {}", e)))?;
        // _id is immutable; keep it out of the $set document
        serialized.remove("_id");

        self.courses
            .update_one(doc! { "_id": course_id }, doc! { "$set": serialized })
            .await?;

        Ok(course)
    }

    /// Delete a course
    pub async fn delete(&self, course_id: &ObjectId) -> Result<()> {
        let result = self.courses.delete_one(doc! { "_id": course_id }).await?;
        if result.deleted_count == 0 {
            return Err(LearngateError::NotFound("No course with that ID".into()));
        }
        info!("Deleted course {}", course_id);
        Ok(())
    }
}

/// Assign stable ids to modules and lessons that do not have one yet
fn materialize_modules(inputs: Vec<ModuleInput>) -> Vec<CourseModule> {
    inputs
        .into_iter()
        .map(|m| CourseModule {
            id: m.id.unwrap_or_else(ObjectId::new),
            title: m.title,
            lessons: m
                .lessons
                .into_iter()
                .map(|l| Lesson {
                    id: l.id.unwrap_or_else(ObjectId::new),
                    title: l.title,
                    kind: l.kind,
                    content: l.content,
                    media_id: l.media_id,
                    duration_seconds: l.duration_seconds,
                    is_free: l.is_free,
                })
                .collect(),
        })
        .collect()
}

/// Build a URL-friendly slug from a title, suffixed with the current
/// timestamp so repeated titles stay unique.
pub fn slugify(title: &str) -> String {
    let base: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let mut collapsed = String::with_capacity(base.len());
    for c in base.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    let trimmed = collapsed.trim_matches('-');

    format!("{}-{}", trimmed, chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_and_trims() {
        let slug = slugify("  Rust & WebAssembly!! ");
        let base = slug.rsplit_once('-').unwrap().0;
        assert_eq!(base, "rust-webassembly");
    }

    #[test]
    fn test_slugify_appends_timestamp() {
        let slug = slugify("Intro to Rust");
        let suffix = slug.rsplit('-').next().unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[test]
    fn test_course_input_validation() {
        let mut input = CourseInput {
            title: "Rust Fundamentals".into(),
            description: "Learn Rust from scratch with hands-on examples".into(),
            price: 49.99,
            thumbnail_media_id: None,
            category: "backend".into(),
            level: CourseLevel::Beginner,
            modules: vec![],
            is_published: false,
        };
        assert!(input.validate().is_ok());

        input.title = "Rust".into();
        assert!(input.validate().is_err());
        input.title = "Rust Fundamentals".into();

        input.price = -1.0;
        assert!(input.validate().is_err());
        input.price = 0.0;

        input.category = "  ".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_materialize_preserves_existing_ids() {
        let module_id = ObjectId::new();
        let lesson_id = ObjectId::new();

        let modules = materialize_modules(vec![ModuleInput {
            id: Some(module_id),
            title: "Basics".into(),
            lessons: vec![
                LessonInput {
                    id: Some(lesson_id),
                    title: "Existing".into(),
                    kind: LessonKind::Video,
                    content: String::new(),
                    media_id: None,
                    duration_seconds: None,
                    is_free: false,
                },
                LessonInput {
                    id: None,
                    title: "New".into(),
                    kind: LessonKind::Text,
                    content: "body".into(),
                    media_id: None,
                    duration_seconds: None,
                    is_free: true,
                },
            ],
        }]);

        assert_eq!(modules[0].id, module_id);
        assert_eq!(modules[0].lessons[0].id, lesson_id);
        // The new lesson received a fresh id distinct from the existing one
        assert_ne!(modules[0].lessons[1].id, lesson_id);
    }
}
