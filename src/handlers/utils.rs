use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::owned_or_not_found;
use crate::database::models::{Habit, HabitEntry};
use crate::error::ApiError;

/// Decode a JSON body into `T`, reporting framing and shape problems as 400s.
pub fn parse_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = body.map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;
    Ok(serde_json::from_value(value)?)
}

/// Path ids that are not integers cannot name a record.
pub fn parse_id(raw: &str, kind: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("{} not found", kind)))
}

pub async fn load_owned_habit(state: &AppState, user_id: Uuid, raw_id: &str) -> Result<Habit, ApiError> {
    let id = parse_id(raw_id, "Habit")?;
    let habit = state.habits.find_by_id(id).await?;
    owned_or_not_found(habit, user_id, "Habit", id)
}

pub async fn load_owned_entry(state: &AppState, user_id: Uuid, raw_id: &str) -> Result<HabitEntry, ApiError> {
    let id = parse_id(raw_id, "Entry")?;
    let entry = state.entries.find_by_id(id).await?;
    owned_or_not_found(entry, user_id, "Entry", id)
}
