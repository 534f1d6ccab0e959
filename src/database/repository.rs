use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Habit, HabitEntry, NewHabit, NewHabitEntry};
use crate::filter::{EntryFilter, HabitFilter};

pub type RepoResult<T> = Result<T, DatabaseError>;

/// Data access for habits. Implementations must scope `find_by_owner`
/// to the given owner; single-record lookups are unscoped and the caller
/// applies the ownership check.
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Owner's habits matching `filter`, ordered by name ascending. PostgreSQL
    /// orders by the column's ICU collation (`sql/schema.sql`); the memory
    /// store compares lowercased names to match.
    async fn find_by_owner(&self, owner: Uuid, filter: &HabitFilter) -> RepoResult<Vec<Habit>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Habit>>;
    async fn insert(&self, habit: NewHabit) -> RepoResult<Habit>;
    /// Persists every mutable column and refreshes `updated_at`.
    async fn update(&self, habit: &Habit) -> RepoResult<Habit>;
    /// Hard delete; the habit's entries are deleted with it. Returns false if
    /// nothing was removed.
    async fn delete(&self, id: i64) -> RepoResult<bool>;
    async fn health_check(&self) -> RepoResult<()>;
}

#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Owner's entries matching `filter`, newest entry_date first.
    async fn find_by_owner(&self, owner: Uuid, filter: &EntryFilter) -> RepoResult<Vec<HabitEntry>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<HabitEntry>>;
    async fn insert(&self, entry: NewHabitEntry) -> RepoResult<HabitEntry>;
    async fn update(&self, entry: &HabitEntry) -> RepoResult<HabitEntry>;
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}
