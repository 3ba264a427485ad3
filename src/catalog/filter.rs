//! Enumerated course filter
//!
//! Parsed from the query string into named, validated, bounded fields.
//! Unknown parameters are ignored; malformed values for known parameters
//! are rejected so a typo never silently returns the whole catalog.

use bson::{doc, Document};
use mongodb::options::FindOptions;

use crate::db::schemas::CourseLevel;
use crate::types::{LearngateError, Result};

/// Default page size for catalog listings
pub const DEFAULT_LIMIT: u64 = 20;
/// Upper bound on page size
pub const MAX_LIMIT: u64 = 100;

/// Validated catalog query
#[derive(Debug, Clone, PartialEq)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub search: Option<String>,
    pub page: u64,
    pub limit: u64,
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            category: None,
            level: None,
            search: None,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl CourseFilter {
    /// Parse from a raw query string (the part after `?`)
    pub fn from_query(query: Option<&str>) -> Result<Self> {
        let mut filter = Self::default();

        let Some(query) = query else {
            return Ok(filter);
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            // Form encoding: '+' means space only before percent-decoding,
            // so an encoded literal plus (%2B) survives
            let value = urlencoding::decode(&value.replace('+', " "))
                .map_err(|_| LearngateError::Validation(format!("{} is not valid UTF-8", key)))?
                .into_owned();

            match key {
                "category" => {
                    if !value.trim().is_empty() {
                        filter.category = Some(value.trim().to_string());
                    }
                }
                "level" => {
                    filter.level = Some(CourseLevel::parse(value.trim()).ok_or_else(|| {
                        LearngateError::Validation(format!("level '{}' is not valid", value))
                    })?);
                }
                "search" => {
                    if !value.trim().is_empty() {
                        filter.search = Some(value.trim().to_string());
                    }
                }
                "page" => {
                    let page: u64 = value.parse().map_err(|_| {
                        LearngateError::Validation("page must be a positive integer".into())
                    })?;
                    filter.page = page.max(1);
                }
                "limit" => {
                    let limit: u64 = value.parse().map_err(|_| {
                        LearngateError::Validation("limit must be a positive integer".into())
                    })?;
                    filter.limit = limit.clamp(1, MAX_LIMIT);
                }
                // Unknown parameters are ignored, never forwarded to the driver
                _ => {}
            }
        }

        Ok(filter)
    }

    /// Build the driver filter document
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(ref category) = self.category {
            filter.insert("category", category);
        }
        if let Some(level) = self.level {
            filter.insert("level", level.as_str());
        }
        if let Some(ref search) = self.search {
            let pattern = escape_regex(search);
            let clauses: Vec<Document> = ["title", "description", "category"]
                .iter()
                .map(|field| doc! { *field: { "$regex": &pattern, "$options": "i" } })
                .collect();
            filter.insert("$or", clauses);
        }

        filter
    }

    /// Pagination options for the driver. The skip saturates so an absurd
    /// but syntactically valid page number yields an empty page, not a panic.
    pub fn to_find_options(&self) -> FindOptions {
        FindOptions::builder()
            .skip(self.page.saturating_sub(1).saturating_mul(self.limit))
            .limit(self.limit as i64)
            .build()
    }
}

/// Escape regex metacharacters in a caller-supplied search term
fn escape_regex(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if ".*+?^${}()|[]\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_yields_defaults() {
        let filter = CourseFilter::from_query(None).unwrap();
        assert_eq!(filter, CourseFilter::default());

        let filter = CourseFilter::from_query(Some("")).unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_parses_named_fields() {
        let filter =
            CourseFilter::from_query(Some("category=backend&level=advanced&search=rust&page=2&limit=10"))
                .unwrap();
        assert_eq!(filter.category.as_deref(), Some("backend"));
        assert_eq!(filter.level, Some(CourseLevel::Advanced));
        assert_eq!(filter.search.as_deref(), Some("rust"));
        assert_eq!(filter.page, 2);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(CourseFilter::from_query(Some("level=wizard")).is_err());
    }

    #[test]
    fn test_invalid_page_rejected() {
        assert!(CourseFilter::from_query(Some("page=abc")).is_err());
        assert!(CourseFilter::from_query(Some("limit=-3")).is_err());
    }

    #[test]
    fn test_limit_is_clamped() {
        let filter = CourseFilter::from_query(Some("limit=5000")).unwrap();
        assert_eq!(filter.limit, MAX_LIMIT);

        let filter = CourseFilter::from_query(Some("page=0")).unwrap();
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let filter = CourseFilter::from_query(Some("sort=-price&fields=title&category=ops")).unwrap();
        assert_eq!(filter.category.as_deref(), Some("ops"));
        // Nothing from the unknown keys leaks into the driver document
        let doc = filter.to_document();
        assert_eq!(doc.keys().count(), 1);
    }

    #[test]
    fn test_search_is_regex_escaped() {
        let filter = CourseFilter::from_query(Some("search=c%2B%2B+(advanced)")).unwrap();
        let doc = filter.to_document();
        let or = doc.get_array("$or").unwrap();
        let first = or[0].as_document().unwrap();
        let pattern = first
            .get_document("title")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(pattern, "c\\+\\+ \\(advanced\\)");
    }

    #[test]
    fn test_encoded_plus_is_not_a_space() {
        // '+' is a space in form encoding, %2B is a literal plus
        let filter = CourseFilter::from_query(Some("search=a%2Bb+c")).unwrap();
        assert_eq!(filter.search.as_deref(), Some("a+b c"));
    }

    #[test]
    fn test_pagination_skip() {
        let filter = CourseFilter::from_query(Some("page=3&limit=10")).unwrap();
        let options = filter.to_find_options();
        assert_eq!(options.skip, Some(20));
        assert_eq!(options.limit, Some(10));
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let query = format!("page={}&limit=100", u64::MAX);
        let filter = CourseFilter::from_query(Some(&query)).unwrap();
        let options = filter.to_find_options();
        assert_eq!(options.skip, Some(u64::MAX));
    }
}
