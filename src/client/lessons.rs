use serde::{Deserialize, Serialize};

use super::courses::{Course, CoursesApi};
use super::pipeline::{seg, RequestPipeline};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "videoUrl", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(rename = "courseId", default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonInput {
    pub title: String,
    pub content: String,
    #[serde(rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl LessonInput {
    /// Blank video URLs are dropped rather than sent.
    pub fn new(title: impl Into<String>, content: impl Into<String>, video_url: Option<&str>) -> Self {
        let video_url = video_url.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        Self { title: title.into(), content: content.into(), video_url }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(AppError::validation("missing_fields", "Title and content are required."));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct NewLesson<'a> {
    #[serde(flatten)]
    input: &'a LessonInput,
    #[serde(rename = "courseId")]
    course_id: &'a str,
}

pub struct LessonsApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> LessonsApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self { Self { pipeline } }

    pub async fn by_course(&self, course_id: &str) -> AppResult<Vec<Lesson>> {
        self.pipeline.get(&format!("/lessons/course/{}", seg(course_id))).await
    }

    pub async fn get(&self, id: &str) -> AppResult<Lesson> {
        self.pipeline.get(&format!("/lessons/{}", seg(id))).await
    }

    pub async fn create(&self, course_id: &str, input: &LessonInput) -> AppResult<serde_json::Value> {
        if course_id.trim().is_empty() {
            return Err(AppError::validation("missing_course", "Unable to add lesson without a course."));
        }
        input.validate()?;
        self.pipeline.post("/lessons", &NewLesson { input, course_id }).await
    }

    pub async fn update(&self, id: &str, input: &LessonInput) -> AppResult<serde_json::Value> {
        input.validate()?;
        self.pipeline.put(&format!("/lessons/{}", seg(id)), input).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<serde_json::Value> {
        self.pipeline.delete(&format!("/lessons/{}", seg(id))).await
    }
}

/// Course and its lessons, fetched concurrently. Either failure fails the whole view.
pub async fn course_with_lessons(pipeline: &RequestPipeline, course_id: &str) -> AppResult<(Course, Vec<Lesson>)> {
    let courses = CoursesApi::new(pipeline);
    let lessons = LessonsApi::new(pipeline);
    tokio::try_join!(courses.get(course_id), lessons.by_course(course_id))
}
