//! HTTP handlers for the REST API.
//!
//! Each handler parses its inputs, delegates to the service layer and maps
//! the outcome onto a status code.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::dto::{HealthResponse, MessageResponse, Teacher, TeacherQuery, TeacherStats};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::TeacherId;
use crate::services::{validate_new_teacher, validate_teacher_patch};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Parse a path segment as a teacher id.
///
/// Only an optional `-` followed by ASCII digits is accepted, so `"12abc"`,
/// `"+5"` and `"1.0"` are all rejected.
pub fn parse_teacher_id(raw: &str) -> Result<TeacherId, AppError> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::invalid_teacher_id());
    }
    raw.parse::<i64>()
        .map(TeacherId::new)
        .map_err(|_| AppError::invalid_teacher_id())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Teachers
// =============================================================================

/// GET /api/teachers?search=&department=&status=
///
/// Without any parameter this is a plain listing.
pub async fn list_teachers(
    State(state): State<AppState>,
    query: Result<Query<TeacherQuery>, QueryRejection>,
) -> HandlerResult<Vec<Teacher>> {
    let Query(query) = query?;
    let repo = state.repository.as_ref();
    let teachers = if query == TeacherQuery::default() {
        db_services::list_teachers(repo).await?
    } else {
        db_services::search_teachers(repo, &query).await?
    };
    Ok(Json(teachers))
}

/// GET /api/teachers/stats
pub async fn get_stats(State(state): State<AppState>) -> HandlerResult<TeacherStats> {
    let stats = db_services::get_stats(state.repository.as_ref()).await?;
    Ok(Json(stats))
}

/// GET /api/teachers/{id}
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<Teacher> {
    let id = parse_teacher_id(&raw_id)?;
    db_services::get_teacher(state.repository.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(AppError::teacher_not_found)
}

/// POST /api/teachers
pub async fn create_teacher(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let Json(payload) = payload?;
    let new_teacher = validate_new_teacher(&payload)?;
    let created = db_services::create_teacher(state.repository.as_ref(), new_teacher).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/teachers/{id}
///
/// The path id replaces any `id` in the body.
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> HandlerResult<Teacher> {
    let id = parse_teacher_id(&raw_id)?;
    let Json(mut payload) = payload?;
    if let Value::Object(ref mut map) = payload {
        map.insert("id".to_string(), Value::from(id.value()));
    }

    let patch = validate_teacher_patch(&payload)?;
    db_services::update_teacher(state.repository.as_ref(), patch)
        .await?
        .map(Json)
        .ok_or_else(AppError::teacher_not_found)
}

/// DELETE /api/teachers/{id}
pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<MessageResponse> {
    let id = parse_teacher_id(&raw_id)?;
    if db_services::delete_teacher(state.repository.as_ref(), id).await? {
        Ok(Json(MessageResponse::new("Teacher deleted successfully")))
    } else {
        Err(AppError::teacher_not_found())
    }
}

// =============================================================================
// Departments
// =============================================================================

/// GET /api/departments
pub async fn list_departments(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    let departments = db_services::list_departments(state.repository.as_ref()).await?;
    Ok(Json(departments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_teacher_id() {
        assert_eq!(parse_teacher_id("42").unwrap(), TeacherId(42));
        assert_eq!(parse_teacher_id("-3").unwrap(), TeacherId(-3));
        for bad in ["", "-", "abc", "12abc", "+5", "1.0", " 7", "99999999999999999999"] {
            assert!(
                matches!(parse_teacher_id(bad), Err(AppError::BadRequest(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
