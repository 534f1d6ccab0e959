//! Business rules checked before a write reaches the store.
//!
//! Every check is a pure function over the incoming value and whatever
//! referenced records the handler already loaded. Handlers compose them
//! explicitly, in the order the write path requires.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Habit, HabitType};

pub const MIN_HABIT_NAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),
}

impl ValidationError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Habit names are required and at least three characters long.
pub fn validate_habit_name(name: &str) -> ValidationResult<&str> {
    if name.is_empty() {
        return Err(ValidationError::invalid_field("name", "Name is required."));
    }
    if name.chars().count() < MIN_HABIT_NAME_LEN {
        return Err(ValidationError::invalid_field(
            "name",
            "Name must be at least 3 characters long.",
        ));
    }
    Ok(name)
}

/// An explicit archive timestamp may not lie in the future.
pub fn validate_archived_at(archived_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ValidationResult<()> {
    match archived_at {
        Some(ts) if ts > now => Err(ValidationError::invalid_field(
            "archived_at",
            "Archive timestamp cannot be in the future.",
        )),
        _ => Ok(()),
    }
}

pub fn validate_entry_ownership(habit: &Habit, requesting_user: Uuid) -> ValidationResult<()> {
    if habit.user_id != requesting_user {
        return Err(ValidationError::Forbidden(
            "You can only create entries for your own habits.".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_entry_target_active(habit: &Habit) -> ValidationResult<()> {
    if habit.is_archived() {
        return Err(ValidationError::InvalidState(
            "Cannot create entries for archived habits.".to_string(),
        ));
    }
    Ok(())
}

/// SINGULAR habits only accept 1; TIMED habits need a positive duration.
pub fn validate_entry_value(habit_type: HabitType, value: f64) -> ValidationResult<()> {
    match habit_type {
        HabitType::Singular if value != 1.0 => Err(ValidationError::invalid_field(
            "value",
            "Singular habits can only have a value of 1.",
        )),
        HabitType::Timed if !(value > 0.0) => Err(ValidationError::invalid_field(
            "value",
            "Timed habits must have a positive value.",
        )),
        _ => Ok(()),
    }
}

/// Checks applied whenever an entry write names a habit: the caller must own
/// it and it must still be active.
pub fn validate_entry_habit(habit: &Habit, requesting_user: Uuid) -> ValidationResult<()> {
    validate_entry_ownership(habit, requesting_user)?;
    validate_entry_target_active(habit)
}
