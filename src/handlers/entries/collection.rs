use axum::{
    extract::{rejection::JsonRejection, Extension, Query, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{HabitEntry, NewHabitEntry};
use crate::error::ApiError;
use crate::filter::{EntryFilter, EntryListQuery};
use crate::handlers::payload::{EntryPayload, WriteMode};
use crate::handlers::utils::parse_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::validate_entry_value;

use super::rules::referenced_habit;

/// GET /entries - the caller's entries, newest first, filtered by
/// `habit_id`, `start_date`, `end_date` and `date`
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryListQuery>,
) -> ApiResult<Vec<HabitEntry>> {
    let filter = EntryFilter::from_query(&query)?;
    let entries = state.entries.find_by_owner(auth_user.user_id, &filter).await?;

    tracing::debug!("Listed {} entries for {} with {:?}", entries.len(), auth_user.user_id, filter);
    Ok(ApiResponse::success(entries))
}

/// POST /entries - log a completion against one of the caller's active habits
///
/// Checks run in order: habit ownership (403), habit not archived (400
/// INVALID_STATE), value allowed for the habit type (400 VALIDATION_ERROR).
/// Several entries for the same habit and date are accepted.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<HabitEntry> {
    let payload: EntryPayload = parse_body(body)?;
    let changes = payload.validate(WriteMode::Create)?;

    let (habit_id, entry_date, value) = match (changes.habit, changes.entry_date, changes.value) {
        (Some(habit_id), Some(entry_date), Some(value)) => (habit_id, entry_date, value),
        _ => return Err(ApiError::validation_error("Invalid input.", None)),
    };

    let habit = referenced_habit(&state, auth_user.user_id, habit_id).await?;
    validate_entry_value(habit.habit_type, value)?;

    let entry = state
        .entries
        .insert(NewHabitEntry {
            user_id: auth_user.user_id,
            habit_id: habit.id,
            entry_date,
            value,
            notes: changes.notes.flatten(),
        })
        .await?;

    tracing::info!("Logged entry {} for habit {} on {}", entry.id, habit.id, entry.entry_date);
    Ok(ApiResponse::created(entry))
}
