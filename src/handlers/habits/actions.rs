use axum::extract::{Extension, Path, State};
use chrono::Utc;

use crate::app::AppState;
use crate::database::models::Habit;
use crate::handlers::utils::load_owned_habit;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /habits/:id/archive - stamp archived_at; no-op when already archived
pub async fn archive(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Habit> {
    let mut habit = load_owned_habit(&state, auth_user.user_id, &id).await?;

    if !habit.is_archived() {
        habit.archived_at = Some(Utc::now());
        habit = state.habits.update(&habit).await?;
        tracing::info!("Archived habit {} for {}", habit.id, auth_user.user_id);
    }

    Ok(ApiResponse::success(habit))
}

/// POST /habits/:id/unarchive - clear archived_at; no-op when already active
pub async fn unarchive(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Habit> {
    let mut habit = load_owned_habit(&state, auth_user.user_id, &id).await?;

    if habit.is_archived() {
        habit.archived_at = None;
        habit = state.habits.update(&habit).await?;
        tracing::info!("Unarchived habit {} for {}", habit.id, auth_user.user_id);
    }

    Ok(ApiResponse::success(habit))
}
