//! Request bodies for habit and entry writes.
//!
//! Every writable field distinguishes "absent" from "null" so PATCH can clear
//! nullable columns. Read-only fields (`id`, `user`, `habit_name`,
//! timestamps) are not declared and therefore ignored when a client sends them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Habit, HabitEntry, HabitType, NewHabit};
use crate::error::ApiError;
use crate::validation::{self, ValidationError};

/// `None` = field absent, `Some(None)` = explicit null.
pub type Field<T> = Option<Option<T>>;

fn present<'de, T, D>(deserializer: D) -> Result<Field<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: required fields must be present.
    Create,
    /// PUT: same requirements as create, applied to an existing record.
    Replace,
    /// PATCH: every field optional.
    Partial,
}

impl WriteMode {
    fn requires_all(&self) -> bool {
        !matches!(self, WriteMode::Partial)
    }
}

#[derive(Debug, Default)]
struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    fn add_validation(&mut self, err: ValidationError) -> Result<(), ApiError> {
        match err {
            ValidationError::InvalidField { field, message } => {
                self.add(&field, message);
                Ok(())
            }
            other => Err(other.into()),
        }
    }

    /// Non-null value of a required field, recording why it is unusable.
    fn required<T>(&mut self, field: &str, value: Field<T>, mode: WriteMode) -> Option<T> {
        match value {
            Some(Some(v)) => Some(v),
            Some(None) => {
                self.add(field, "This field may not be null.");
                None
            }
            None => {
                if mode.requires_all() {
                    self.add(field, "This field is required.");
                }
                None
            }
        }
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input.", Some(self.0)))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HabitPayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Field<String>,
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub habit_type: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub archived_at: Field<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub color: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub goal_value: Field<f64>,
    #[serde(default, deserialize_with = "present")]
    pub goal_unit: Field<String>,
}

/// Validated habit changes; `None` leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub description: Field<String>,
    pub habit_type: Option<HabitType>,
    pub archived_at: Field<DateTime<Utc>>,
    pub color: Field<String>,
    pub goal_value: Field<f64>,
    pub goal_unit: Field<String>,
}

impl HabitPayload {
    pub fn validate(self, mode: WriteMode, now: DateTime<Utc>) -> Result<HabitChanges, ApiError> {
        let mut errors = FieldErrors::default();

        // Surrounding whitespace is dropped before the length rule and is never stored
        let name = match errors.required("name", self.name, mode).map(|n| n.trim().to_string()) {
            Some(name) => match validation::validate_habit_name(&name).map(|_| ()) {
                Ok(_) => Some(name),
                Err(err) => {
                    errors.add_validation(err)?;
                    None
                }
            },
            None => None,
        };

        let habit_type = match errors.required("type", self.habit_type, mode) {
            Some(raw) => match raw.parse::<HabitType>() {
                Ok(t) => Some(t),
                Err(err) => {
                    errors.add("type", err.to_string());
                    None
                }
            },
            None => None,
        };

        if let Some(archived_at) = self.archived_at {
            if let Err(err) = validation::validate_archived_at(archived_at, now) {
                errors.add_validation(err)?;
            }
        }

        errors.finish()?;

        Ok(HabitChanges {
            name,
            description: self.description,
            habit_type,
            archived_at: self.archived_at,
            color: self.color,
            goal_value: self.goal_value,
            goal_unit: self.goal_unit,
        })
    }
}

impl HabitChanges {
    /// Builds the insert for `owner`; ownership never comes from the body.
    pub fn into_new_habit(self, owner: Uuid) -> Result<NewHabit, ApiError> {
        Ok(NewHabit {
            user_id: owner,
            name: self.name.ok_or_else(|| ApiError::field_error("name", "This field is required."))?,
            description: self.description.flatten(),
            habit_type: self.habit_type.ok_or_else(|| ApiError::field_error("type", "This field is required."))?,
            archived_at: self.archived_at.flatten(),
            color: self.color.flatten(),
            goal_value: self.goal_value.flatten(),
            goal_unit: self.goal_unit.flatten(),
        })
    }

    pub fn apply_to(self, habit: &mut Habit) {
        if let Some(name) = self.name {
            habit.name = name;
        }
        if let Some(description) = self.description {
            habit.description = description;
        }
        if let Some(habit_type) = self.habit_type {
            habit.habit_type = habit_type;
        }
        if let Some(archived_at) = self.archived_at {
            habit.archived_at = archived_at;
        }
        if let Some(color) = self.color {
            habit.color = color;
        }
        if let Some(goal_value) = self.goal_value {
            habit.goal_value = goal_value;
        }
        if let Some(goal_unit) = self.goal_unit {
            habit.goal_unit = goal_unit;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryPayload {
    #[serde(default, deserialize_with = "present")]
    pub habit: Field<i64>,
    #[serde(default, deserialize_with = "present")]
    pub entry_date: Field<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub value: Field<f64>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Field<String>,
}

#[derive(Debug, Default)]
pub struct EntryChanges {
    pub habit: Option<i64>,
    pub entry_date: Option<NaiveDate>,
    pub value: Option<f64>,
    pub notes: Field<String>,
}

impl EntryPayload {
    pub fn validate(self, mode: WriteMode) -> Result<EntryChanges, ApiError> {
        let mut errors = FieldErrors::default();
        let habit = errors.required("habit", self.habit, mode);
        let entry_date = errors.required("entry_date", self.entry_date, mode);
        let value = errors.required("value", self.value, mode);
        errors.finish()?;

        Ok(EntryChanges {
            habit,
            entry_date,
            value,
            notes: self.notes,
        })
    }
}

impl EntryChanges {
    /// True when the habit/value cross-check has to run for this write.
    pub fn touches_value_rule(&self) -> bool {
        self.habit.is_some() || self.value.is_some()
    }

    pub fn apply_to(self, entry: &mut HabitEntry) {
        if let Some(habit) = self.habit {
            entry.habit_id = habit;
        }
        if let Some(entry_date) = self.entry_date {
            entry.entry_date = entry_date;
        }
        if let Some(value) = self.value {
            entry.value = value;
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn habit_payload(body: serde_json::Value) -> HabitPayload {
        serde_json::from_value(body).unwrap()
    }

    fn field_errors(err: ApiError) -> serde_json::Value {
        err.to_json()["field_errors"].clone()
    }

    #[test]
    fn distinguishes_absent_from_null() {
        let payload = habit_payload(json!({ "description": null }));
        assert_eq!(payload.description, Some(None));
        assert_eq!(payload.color, None);
    }

    #[test]
    fn create_requires_name_and_type() {
        let err = habit_payload(json!({})).validate(WriteMode::Create, Utc::now()).unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors["name"], "This field is required.");
        assert_eq!(errors["type"], "This field is required.");
    }

    #[test]
    fn patch_accepts_an_empty_body() {
        let changes = habit_payload(json!({})).validate(WriteMode::Partial, Utc::now()).unwrap();
        assert!(changes.name.is_none() && changes.habit_type.is_none());
    }

    #[test]
    fn rejects_unknown_type_and_short_name_together() {
        let err = habit_payload(json!({ "name": "Ab", "type": "WEEKLY" }))
            .validate(WriteMode::Create, Utc::now())
            .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors["name"], "Name must be at least 3 characters long.");
        assert_eq!(errors["type"], "\"WEEKLY\" is not a valid choice.");
    }

    #[test]
    fn names_are_trimmed_before_validation() {
        let err = habit_payload(json!({ "name": "   ", "type": "SINGULAR" }))
            .validate(WriteMode::Create, Utc::now())
            .unwrap_err();
        assert_eq!(field_errors(err)["name"], "Name is required.");

        let err = habit_payload(json!({ "name": " ab ", "type": "SINGULAR" }))
            .validate(WriteMode::Create, Utc::now())
            .unwrap_err();
        assert_eq!(field_errors(err)["name"], "Name must be at least 3 characters long.");

        let changes = habit_payload(json!({ "name": "  Run  " }))
            .validate(WriteMode::Partial, Utc::now())
            .unwrap();
        assert_eq!(changes.name.as_deref(), Some("Run"));
    }

    #[test]
    fn client_cannot_choose_owner() {
        let owner = Uuid::new_v4();
        let new = habit_payload(json!({ "name": "Run", "type": "SINGULAR", "user": Uuid::new_v4() }))
            .validate(WriteMode::Create, Utc::now())
            .unwrap()
            .into_new_habit(owner)
            .unwrap();
        assert_eq!(new.user_id, owner);
        assert_eq!(new.archived_at, None);
    }

    #[test]
    fn entry_put_requires_all_fields_but_patch_does_not() {
        let body = json!({ "notes": "felt good" });
        let err = serde_json::from_value::<EntryPayload>(body.clone())
            .unwrap()
            .validate(WriteMode::Replace)
            .unwrap_err();
        let errors = field_errors(err);
        for field in ["habit", "entry_date", "value"] {
            assert_eq!(errors[field], "This field is required.");
        }

        let changes = serde_json::from_value::<EntryPayload>(body)
            .unwrap()
            .validate(WriteMode::Partial)
            .unwrap();
        assert!(!changes.touches_value_rule());
        assert_eq!(changes.notes, Some(Some("felt good".to_string())));
    }
}
