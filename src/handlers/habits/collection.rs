use axum::{
    extract::{rejection::JsonRejection, Extension, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Habit;
use crate::filter::{HabitFilter, HabitListQuery};
use crate::handlers::payload::{HabitPayload, WriteMode};
use crate::handlers::utils::parse_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /habits - the caller's habits, active only unless `?archived=true`
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<HabitListQuery>,
) -> ApiResult<Vec<Habit>> {
    let filter = HabitFilter::from_query(&query);
    let habits = state.habits.find_by_owner(auth_user.user_id, &filter).await?;

    tracing::debug!("Listed {} {:?} habits for {}", habits.len(), filter.archived, auth_user.user_id);
    Ok(ApiResponse::success(habits))
}

/// POST /habits - create a habit owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Habit> {
    let payload: HabitPayload = parse_body(body)?;
    let new_habit = payload
        .validate(WriteMode::Create, Utc::now())?
        .into_new_habit(auth_user.user_id)?;

    let habit = state.habits.insert(new_habit).await?;

    tracing::info!("Created habit {} ({}) for {}", habit.id, habit.habit_type, auth_user.user_id);
    Ok(ApiResponse::created(habit))
}
