use serde::{Deserialize, Serialize};

use super::pipeline::{seg, RequestPipeline};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl CourseInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() || self.category.trim().is_empty() {
            return Err(AppError::validation("missing_fields", "Title, description, and category are required."));
        }
        Ok(())
    }
}

pub struct CoursesApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> CoursesApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self { Self { pipeline } }

    pub async fn list(&self) -> AppResult<Vec<Course>> {
        self.pipeline.get("/courses").await
    }

    pub async fn get(&self, id: &str) -> AppResult<Course> {
        self.pipeline.get(&format!("/courses/{}", seg(id))).await
    }

    pub async fn create(&self, input: &CourseInput) -> AppResult<serde_json::Value> {
        input.validate()?;
        self.pipeline.post("/courses", input).await
    }

    pub async fn update(&self, id: &str, input: &CourseInput) -> AppResult<serde_json::Value> {
        input.validate()?;
        self.pipeline.put(&format!("/courses/{}", seg(id)), input).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<serde_json::Value> {
        self.pipeline.delete(&format!("/courses/{}", seg(id))).await
    }
}

/// Case-insensitive match on title, category or description. A blank query keeps
/// everything; otherwise the query is matched as typed, surrounding spaces included.
pub fn filter_courses<'c>(courses: &'c [Course], query: &str) -> Vec<&'c Course> {
    if query.trim().is_empty() { return courses.iter().collect(); }
    let q = query.to_lowercase();
    courses
        .iter()
        .filter(|c| {
            c.title.to_lowercase().contains(&q)
                || c.category.to_lowercase().contains(&q)
                || c.description.to_lowercase().contains(&q)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, title: &str, category: &str, description: &str) -> Course {
        Course { id: id.into(), title: title.into(), category: category.into(), description: description.into() }
    }

    #[test]
    fn decodes_backend_shape() {
        let c: Course = serde_json::from_str(
            r#"{"_id":"c1","title":"Soil","description":"Basics","category":"Farming","instructor":{"_id":"u9"}}"#,
        ).unwrap();
        assert_eq!(c.id, "c1");
        assert_eq!(c.category, "Farming");
    }

    #[test]
    fn filter_matches_any_field() {
        let all = vec![
            course("1", "Soil Health", "Farming", "Compost and crop rotation"),
            course("2", "Intro to Rust", "Programming", "Ownership"),
            course("3", "Bookkeeping", "Business", "Ledgers for farm shops"),
        ];
        assert_eq!(filter_courses(&all, "").len(), 3);
        assert_eq!(filter_courses(&all, "  ").len(), 3);
        let ids: Vec<_> = filter_courses(&all, "FARM").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(filter_courses(&all, "quantum").is_empty());
    }

    #[test]
    fn filter_keeps_spaces_in_query() {
        let all = vec![course("1", "Soil Health", "Farming", "Compost")];
        assert_eq!(filter_courses(&all, "soil h").len(), 1);
        assert!(filter_courses(&all, " soil").is_empty());
        assert!(filter_courses(&all, "health ").is_empty());
    }

    #[test]
    fn input_requires_all_fields() {
        let bad = CourseInput { title: "T".into(), description: " ".into(), category: "C".into() };
        assert!(matches!(bad.validate(), Err(AppError::ValidationFailed { .. })));
    }
}
