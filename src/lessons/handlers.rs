use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    error::{AppError, INVALID_BODY},
    extract::Json,
    lessons::{
        dto::{
            CompleteLessonRequest, CompleteLessonResponse, CreateLessonRequest,
            LessonListResponse, LessonResponse,
        },
        repo_types::NewLesson,
    },
    state::AppState,
};

pub fn lesson_routes() -> Router<AppState> {
    Router::new()
        .route("/lessons", get(list_lessons).post(create_lesson))
        .route("/lessons/:id", get(get_lesson))
        .route("/lessons/:id/complete", post(complete_lesson))
}

#[instrument(skip(state, _user))]
pub async fn list_lessons(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<LessonListResponse>, AppError> {
    let lessons = state.lessons.list_published().await?;
    Ok(Json(LessonListResponse {
        success: true,
        count: lessons.len(),
        lessons,
    }))
}

#[instrument(skip(state, _user))]
pub async fn get_lesson(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LessonResponse>, AppError> {
    let lesson = state
        .lessons
        .get_published(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".into()))?;
    Ok(Json(LessonResponse {
        success: true,
        message: None,
        lesson,
    }))
}

#[instrument(skip(state, claims, body), fields(user_id = %claims.sub))]
pub async fn create_lesson(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<LessonResponse>), AppError> {
    if claims.role != Role::Instructor {
        warn!(role = %claims.role, "lesson creation by non-instructor");
        return Err(AppError::Forbidden);
    }

    let title = body.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let content = body.content.unwrap_or_default();
    if title.is_empty() || content.trim().is_empty() {
        return Err(AppError::Validation("Title and content are required".into()));
    }
    let estimated_duration = body.estimated_duration.unwrap_or(30);
    if estimated_duration <= 0 {
        return Err(AppError::Validation(
            "Estimated duration must be positive".into(),
        ));
    }

    let lesson = state
        .lessons
        .create(NewLesson {
            title,
            description: body.description.unwrap_or_default(),
            content,
            instructor_id: claims.sub,
            category: body.category.unwrap_or_else(|| "Security".into()),
            difficulty_level: body.difficulty_level.unwrap_or_else(|| "Beginner".into()),
            estimated_duration,
        })
        .await?;

    info!(lesson_id = %lesson.id, "lesson created");
    Ok((
        StatusCode::CREATED,
        Json(LessonResponse {
            success: true,
            message: Some("Lesson created successfully"),
            lesson,
        }),
    ))
}

#[instrument(skip(state, claims, body), fields(user_id = %claims.sub))]
pub async fn complete_lesson(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<CompleteLessonResponse>, AppError> {
    let body = parse_completion(&body)?;

    if let Some(score) = body.score {
        if !(0.0..=100.0).contains(&score) {
            return Err(AppError::Validation("Score must be between 0 and 100".into()));
        }
    }

    if state.lessons.get_published(id).await?.is_none() {
        return Err(AppError::NotFound("Lesson not found".into()));
    }

    let enrollment = state.lessons.complete(claims.sub, id, body.score).await?;
    info!(lesson_id = %id, "lesson completed");
    Ok(Json(CompleteLessonResponse {
        success: true,
        message: "Lesson marked as completed",
        enrollment,
    }))
}

/// An empty body means "no score"; anything else must be valid JSON.
fn parse_completion(body: &[u8]) -> Result<CompleteLessonRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CompleteLessonRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "completion body rejected");
        AppError::Validation(INVALID_BODY.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_completion_body_has_no_score() {
        assert_eq!(parse_completion(b"").expect("empty").score, None);
        assert_eq!(parse_completion(b"  \n").expect("blank").score, None);
        assert_eq!(parse_completion(b"{}").expect("object").score, None);
        assert_eq!(parse_completion(br#"{"score": 72}"#).expect("score").score, Some(72.0));
    }

    #[test]
    fn malformed_completion_body_is_rejected() {
        for body in [&br#"{"score":"abc"}"#[..], b"not json", b"[1,2]"] {
            let err = parse_completion(body).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m.as_str() == INVALID_BODY));
        }
    }
}
