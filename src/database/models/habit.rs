use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// How an entry's value is interpreted for a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HabitType {
    /// Done / not done. Entries carry the value 1.
    Singular,
    /// Duration based. Entries carry a positive amount.
    Timed,
}

impl HabitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Singular => "SINGULAR",
            HabitType::Timed => "TIMED",
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct InvalidHabitType(pub String);

impl FromStr for HabitType {
    type Err = InvalidHabitType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGULAR" => Ok(HabitType::Singular),
            "TIMED" => Ok(HabitType::Timed),
            other => Err(InvalidHabitType(other.to_string())),
        }
    }
}

impl TryFrom<String> for HabitType {
    type Error = InvalidHabitType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub habit_type: HabitType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub color: Option<String>,
    pub goal_value: Option<f64>,
    pub goal_unit: Option<String>,
}

impl Habit {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Insert payload; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub habit_type: HabitType,
    pub archived_at: Option<DateTime<Utc>>,
    pub color: Option<String>,
    pub goal_value: Option<f64>,
    pub goal_unit: Option<String>,
}
