use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lesson row joined with its instructor's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
    pub instructor_id: Option<Uuid>,
    pub instructor_name: Option<String>,
    pub category: String,
    pub difficulty_level: String,
    pub estimated_duration: i32,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: String,
    pub description: String,
    pub content: String,
    pub instructor_id: Uuid,
    pub category: String,
    pub difficulty_level: String,
    pub estimated_duration: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Enrollment {
    pub student_id: Uuid,
    pub lesson_id: Uuid,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub score: Option<f64>,
}
