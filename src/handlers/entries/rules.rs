use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Habit;
use crate::error::ApiError;
use crate::validation::{validate_entry_habit, ValidationError};

/// Loads the habit an entry write points at and checks the caller may log
/// against it. A missing habit is reported exactly like a foreign one.
pub async fn referenced_habit(state: &AppState, user_id: Uuid, habit_id: i64) -> Result<Habit, ApiError> {
    let habit = state.habits.find_by_id(habit_id).await?.ok_or_else(|| {
        ValidationError::Forbidden("You can only create entries for your own habits.".to_string())
    })?;
    validate_entry_habit(&habit, user_id)?;
    Ok(habit)
}
