use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Habit;
use crate::error::ApiError;
use crate::handlers::payload::{HabitPayload, WriteMode};
use crate::handlers::utils::{load_owned_habit, parse_body};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /habits/:id - active or archived, as long as the caller owns it
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Habit> {
    let habit = load_owned_habit(&state, auth_user.user_id, &id).await?;
    Ok(ApiResponse::success(habit))
}

/// PUT /habits/:id - name and type required
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Habit> {
    update(&state, &auth_user, &id, body, WriteMode::Replace).await
}

/// PATCH /habits/:id - only the supplied fields change
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Habit> {
    update(&state, &auth_user, &id, body, WriteMode::Partial).await
}

/// DELETE /habits/:id - hard delete, cascading to the habit's entries
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let habit = load_owned_habit(&state, auth_user.user_id, &id).await?;

    if !state.habits.delete(habit.id).await? {
        return Err(ApiError::not_found("Habit not found"));
    }

    tracing::info!("Deleted habit {} for {}", habit.id, auth_user.user_id);
    Ok(ApiResponse::no_content())
}

async fn update(
    state: &AppState,
    auth_user: &AuthUser,
    id: &str,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Habit> {
    let mut habit = load_owned_habit(state, auth_user.user_id, id).await?;
    let payload: HabitPayload = parse_body(body)?;

    payload.validate(mode, Utc::now())?.apply_to(&mut habit);
    let habit = state.habits.update(&habit).await?;

    tracing::debug!("Updated habit {} for {}", habit.id, auth_user.user_id);
    Ok(ApiResponse::success(habit))
}
