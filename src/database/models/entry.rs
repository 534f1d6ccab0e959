use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A dated completion logged against a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HabitEntry {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "habit")]
    pub habit_id: i64,
    /// Name of the referenced habit at read time (joined, never written).
    pub habit_name: String,
    pub entry_date: NaiveDate,
    pub value: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHabitEntry {
    pub user_id: Uuid,
    pub habit_id: i64,
    pub entry_date: NaiveDate,
    pub value: f64,
    pub notes: Option<String>,
}
