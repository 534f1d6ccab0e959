use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::HabitEntry;
use crate::error::ApiError;
use crate::handlers::payload::{EntryPayload, WriteMode};
use crate::handlers::utils::{load_owned_entry, parse_body};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::validate_entry_value;

use super::rules::referenced_habit;

/// GET /entries/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<HabitEntry> {
    let entry = load_owned_entry(&state, auth_user.user_id, &id).await?;
    Ok(ApiResponse::success(entry))
}

/// PUT /entries/:id - habit, entry_date and value required
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<HabitEntry> {
    update(&state, &auth_user, &id, body, WriteMode::Replace).await
}

/// PATCH /entries/:id
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<HabitEntry> {
    update(&state, &auth_user, &id, body, WriteMode::Partial).await
}

/// DELETE /entries/:id - hard delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let entry = load_owned_entry(&state, auth_user.user_id, &id).await?;

    if !state.entries.delete(entry.id).await? {
        return Err(ApiError::not_found("Entry not found"));
    }

    tracing::info!("Deleted entry {} for {}", entry.id, auth_user.user_id);
    Ok(ApiResponse::no_content())
}

/// Re-checks the habit/value rule against the effective values whenever the
/// write touches the habit reference or the value.
async fn update(
    state: &AppState,
    auth_user: &AuthUser,
    id: &str,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<HabitEntry> {
    let mut entry = load_owned_entry(state, auth_user.user_id, id).await?;
    let payload: EntryPayload = parse_body(body)?;
    let changes = payload.validate(mode)?;

    if changes.touches_value_rule() {
        let habit = match changes.habit {
            Some(habit_id) => referenced_habit(state, auth_user.user_id, habit_id).await?,
            None => state
                .habits
                .find_by_id(entry.habit_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Entry not found"))?,
        };
        validate_entry_value(habit.habit_type, changes.value.unwrap_or(entry.value))?;
    }

    changes.apply_to(&mut entry);
    let entry = state.entries.update(&entry).await?;

    tracing::debug!("Updated entry {} for {}", entry.id, auth_user.user_id);
    Ok(ApiResponse::success(entry))
}
