use serde::{Deserialize, Serialize};

use super::repo_types::{Enrollment, Lesson};

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub difficulty_level: Option<String>,
    pub estimated_duration: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteLessonRequest {
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LessonListResponse {
    pub success: bool,
    pub count: usize,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub lesson: Lesson,
}

#[derive(Debug, Serialize)]
pub struct CompleteLessonResponse {
    pub success: bool,
    pub message: &'static str,
    pub enrollment: Enrollment,
}
