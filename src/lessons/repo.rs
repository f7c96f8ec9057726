use std::{collections::HashMap, sync::Arc};

use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::db::StoreError;
use crate::lessons::repo_types::{Enrollment, Lesson, NewLesson};

#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Published lessons, newest first.
    async fn list_published(&self) -> Result<Vec<Lesson>, StoreError>;
    async fn get_published(&self, id: Uuid) -> Result<Option<Lesson>, StoreError>;
    async fn create(&self, lesson: NewLesson) -> Result<Lesson, StoreError>;
    async fn count_by_instructor(&self, instructor_id: Uuid) -> Result<i64, StoreError>;
    /// Marks the lesson completed for the student, creating the enrollment if needed.
    async fn complete(
        &self,
        student_id: Uuid,
        lesson_id: Uuid,
        score: Option<f64>,
    ) -> Result<Enrollment, StoreError>;
}

#[derive(Clone)]
pub struct PgLessonStore {
    db: PgPool,
}

impl PgLessonStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LessonStore for PgLessonStore {
    async fn list_published(&self) -> Result<Vec<Lesson>, StoreError> {
        let rows = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT l.id, l.title, l.description, l.content, l.instructor_id,
                   u.name AS instructor_name, l.category, l.difficulty_level,
                   l.estimated_duration, l.is_published, l.created_at
            FROM lessons l
            LEFT JOIN users u ON l.instructor_id = u.id
            WHERE l.is_published = TRUE
            ORDER BY l.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_published(&self, id: Uuid) -> Result<Option<Lesson>, StoreError> {
        let row = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT l.id, l.title, l.description, l.content, l.instructor_id,
                   u.name AS instructor_name, l.category, l.difficulty_level,
                   l.estimated_duration, l.is_published, l.created_at
            FROM lessons l
            LEFT JOIN users u ON l.instructor_id = u.id
            WHERE l.id = $1 AND l.is_published = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, lesson: NewLesson) -> Result<Lesson, StoreError> {
        let row = sqlx::query_as::<_, Lesson>(
            r#"
            WITH inserted AS (
                INSERT INTO lessons (
                    title, description, content, instructor_id,
                    category, difficulty_level, estimated_duration, is_published
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
                RETURNING *
            )
            SELECT i.id, i.title, i.description, i.content, i.instructor_id,
                   u.name AS instructor_name, i.category, i.difficulty_level,
                   i.estimated_duration, i.is_published, i.created_at
            FROM inserted i
            LEFT JOIN users u ON i.instructor_id = u.id
            "#,
        )
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(lesson.instructor_id)
        .bind(&lesson.category)
        .bind(&lesson.difficulty_level)
        .bind(lesson.estimated_duration)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn count_by_instructor(&self, instructor_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lessons WHERE instructor_id = $1",
        )
        .bind(instructor_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn complete(
        &self,
        student_id: Uuid,
        lesson_id: Uuid,
        score: Option<f64>,
    ) -> Result<Enrollment, StoreError> {
        let row = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (student_id, lesson_id, completed, completed_at, score)
            VALUES ($1, $2, TRUE, NOW(), $3)
            ON CONFLICT (student_id, lesson_id)
            DO UPDATE SET completed = TRUE, completed_at = NOW(), score = EXCLUDED.score
            RETURNING student_id, lesson_id, completed, completed_at, score
            "#,
        )
        .bind(student_id)
        .bind(lesson_id)
        .bind(score)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }
}

/// In-process lesson store. Instructor names are resolved through the
/// user store at insert time.
pub struct MemoryLessonStore {
    users: Arc<dyn UserStore>,
    lessons: RwLock<Vec<Lesson>>,
    enrollments: RwLock<HashMap<(Uuid, Uuid), Enrollment>>,
}

impl MemoryLessonStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            lessons: RwLock::new(Vec::new()),
            enrollments: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl LessonStore for MemoryLessonStore {
    async fn list_published(&self) -> Result<Vec<Lesson>, StoreError> {
        let lessons = self.lessons.read().await;
        Ok(lessons.iter().rev().filter(|l| l.is_published).cloned().collect())
    }

    async fn get_published(&self, id: Uuid) -> Result<Option<Lesson>, StoreError> {
        let lessons = self.lessons.read().await;
        Ok(lessons
            .iter()
            .find(|l| l.id == id && l.is_published)
            .cloned())
    }

    async fn create(&self, lesson: NewLesson) -> Result<Lesson, StoreError> {
        let instructor_name = self
            .users
            .find_by_id(lesson.instructor_id)
            .await?
            .map(|u| u.name);
        let created = Lesson {
            id: Uuid::new_v4(),
            title: lesson.title,
            description: lesson.description,
            content: lesson.content,
            instructor_id: Some(lesson.instructor_id),
            instructor_name,
            category: lesson.category,
            difficulty_level: lesson.difficulty_level,
            estimated_duration: lesson.estimated_duration,
            is_published: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.lessons.write().await.push(created.clone());
        Ok(created)
    }

    async fn count_by_instructor(&self, instructor_id: Uuid) -> Result<i64, StoreError> {
        let lessons = self.lessons.read().await;
        Ok(lessons
            .iter()
            .filter(|l| l.instructor_id == Some(instructor_id))
            .count() as i64)
    }

    async fn complete(
        &self,
        student_id: Uuid,
        lesson_id: Uuid,
        score: Option<f64>,
    ) -> Result<Enrollment, StoreError> {
        let enrollment = Enrollment {
            student_id,
            lesson_id,
            completed: true,
            completed_at: Some(OffsetDateTime::now_utc()),
            score,
        };
        self.enrollments
            .write()
            .await
            .insert((student_id, lesson_id), enrollment.clone());
        Ok(enrollment)
    }
}
