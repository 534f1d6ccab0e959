use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Habit, HabitEntry, NewHabit, NewHabitEntry};
use crate::database::repository::{EntryRepository, HabitRepository, RepoResult};
use crate::filter::{EntryFilter, HabitFilter};

#[derive(Default)]
struct Tables {
    habits: BTreeMap<i64, Habit>,
    entries: BTreeMap<i64, HabitEntry>,
    next_habit_id: i64,
    next_entry_id: i64,
}

impl Tables {
    fn habit_name(&self, habit_id: i64) -> RepoResult<String> {
        self.habits
            .get(&habit_id)
            .map(|h| h.name.clone())
            .ok_or_else(|| DatabaseError::QueryError(format!("habit {} referenced by entry does not exist", habit_id)))
    }

    /// Entry with its denormalised habit name refreshed.
    fn joined(&self, entry: &HabitEntry) -> HabitEntry {
        let mut entry = entry.clone();
        if let Some(habit) = self.habits.get(&entry.habit_id) {
            entry.habit_name = habit.name.clone();
        }
        entry
    }
}

/// Case-insensitive name order with lowercase first on ties, then id. Follows
/// the ICU root collation the `habits.name` column is declared with.
fn by_name(a: &Habit, b: &Habit) -> std::cmp::Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| b.name.cmp(&a.name))
        .then(a.id.cmp(&b.id))
}

/// Process-local store used when no database is configured, and by tests.
/// Behaves like the PostgreSQL store, including cascade on habit delete.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HabitRepository for MemoryStore {
    async fn find_by_owner(&self, owner: Uuid, filter: &HabitFilter) -> RepoResult<Vec<Habit>> {
        let tables = self.tables.read().await;
        let mut habits: Vec<Habit> = tables
            .habits
            .values()
            .filter(|h| h.user_id == owner && filter.matches(h))
            .cloned()
            .collect();
        habits.sort_by(|a, b| by_name(a, b));
        Ok(habits)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Habit>> {
        Ok(self.tables.read().await.habits.get(&id).cloned())
    }

    async fn insert(&self, habit: NewHabit) -> RepoResult<Habit> {
        let mut tables = self.tables.write().await;
        tables.next_habit_id += 1;
        let now = Utc::now();
        let record = Habit {
            id: tables.next_habit_id,
            user_id: habit.user_id,
            name: habit.name,
            description: habit.description,
            habit_type: habit.habit_type,
            created_at: now,
            updated_at: now,
            archived_at: habit.archived_at,
            color: habit.color,
            goal_value: habit.goal_value,
            goal_unit: habit.goal_unit,
        };
        tables.habits.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, habit: &Habit) -> RepoResult<Habit> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .habits
            .get_mut(&habit.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("habit {}", habit.id)))?;

        // Owner and created_at are not writable through update
        stored.name = habit.name.clone();
        stored.description = habit.description.clone();
        stored.habit_type = habit.habit_type;
        stored.archived_at = habit.archived_at;
        stored.color = habit.color.clone();
        stored.goal_value = habit.goal_value;
        stored.goal_unit = habit.goal_unit.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.habits.remove(&id).is_none() {
            return Ok(false);
        }
        tables.entries.retain(|_, e| e.habit_id != id);
        Ok(true)
    }

    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for MemoryStore {
    async fn find_by_owner(&self, owner: Uuid, filter: &EntryFilter) -> RepoResult<Vec<HabitEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<HabitEntry> = tables
            .entries
            .values()
            .filter(|e| e.user_id == owner && filter.matches(e))
            .map(|e| tables.joined(e))
            .collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<HabitEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.entries.get(&id).map(|e| tables.joined(e)))
    }

    async fn insert(&self, entry: NewHabitEntry) -> RepoResult<HabitEntry> {
        let mut tables = self.tables.write().await;
        let habit_name = tables.habit_name(entry.habit_id)?;
        tables.next_entry_id += 1;
        let now = Utc::now();
        let record = HabitEntry {
            id: tables.next_entry_id,
            user_id: entry.user_id,
            habit_id: entry.habit_id,
            habit_name,
            entry_date: entry.entry_date,
            value: entry.value,
            notes: entry.notes,
            created_at: now,
            updated_at: now,
        };
        tables.entries.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, entry: &HabitEntry) -> RepoResult<HabitEntry> {
        let mut tables = self.tables.write().await;
        let habit_name = tables.habit_name(entry.habit_id)?;
        let stored = tables
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("entry {}", entry.id)))?;

        stored.habit_id = entry.habit_id;
        stored.habit_name = habit_name;
        stored.entry_date = entry.entry_date;
        stored.value = entry.value;
        stored.notes = entry.notes.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables.write().await.entries.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::HabitType;
    use crate::filter::ArchivedFilter;
    use chrono::NaiveDate;

    fn new_habit(owner: Uuid, name: &str) -> NewHabit {
        NewHabit {
            user_id: owner,
            name: name.to_string(),
            description: None,
            habit_type: HabitType::Singular,
            archived_at: None,
            color: None,
            goal_value: None,
            goal_unit: None,
        }
    }

    fn new_entry(owner: Uuid, habit_id: i64, day: u32) -> NewHabitEntry {
        NewHabitEntry {
            user_id: owner,
            habit_id,
            entry_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            value: 1.0,
            notes: None,
        }
    }

    #[tokio::test]
    async fn lists_are_owner_scoped_and_sorted_by_name() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        HabitRepository::insert(&store, new_habit(alice, "Walk")).await.unwrap();
        HabitRepository::insert(&store, new_habit(alice, "Read")).await.unwrap();
        HabitRepository::insert(&store, new_habit(bob, "Swim")).await.unwrap();

        let habits = HabitRepository::find_by_owner(&store, alice, &HabitFilter::default()).await.unwrap();
        let names: Vec<_> = habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Read", "Walk"]);

        let archived = HabitFilter { archived: ArchivedFilter::Archived };
        assert!(HabitRepository::find_by_owner(&store, alice, &archived).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn name_order_ignores_case() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for name in ["banana", "Cherry", "apple", "Apple"] {
            HabitRepository::insert(&store, new_habit(owner, name)).await.unwrap();
        }

        let habits = HabitRepository::find_by_owner(&store, owner, &HabitFilter::default()).await.unwrap();
        let names: Vec<_> = habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "Apple", "banana", "Cherry"]);
    }

    #[tokio::test]
    async fn deleting_a_habit_cascades_to_its_entries() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let run = HabitRepository::insert(&store, new_habit(owner, "Run")).await.unwrap();
        let read = HabitRepository::insert(&store, new_habit(owner, "Read")).await.unwrap();
        EntryRepository::insert(&store, new_entry(owner, run.id, 1)).await.unwrap();
        let kept = EntryRepository::insert(&store, new_entry(owner, read.id, 2)).await.unwrap();

        assert!(HabitRepository::delete(&store, run.id).await.unwrap());
        assert!(!HabitRepository::delete(&store, run.id).await.unwrap());

        let entries = EntryRepository::find_by_owner(&store, owner, &EntryFilter::default()).await.unwrap();
        assert_eq!(entries, vec![kept]);
    }

    #[tokio::test]
    async fn entries_follow_habit_renames_and_sort_newest_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut habit = HabitRepository::insert(&store, new_habit(owner, "Run")).await.unwrap();
        EntryRepository::insert(&store, new_entry(owner, habit.id, 1)).await.unwrap();
        EntryRepository::insert(&store, new_entry(owner, habit.id, 9)).await.unwrap();

        habit.name = "Morning run".to_string();
        HabitRepository::update(&store, &habit).await.unwrap();

        let entries = EntryRepository::find_by_owner(&store, owner, &EntryFilter::default()).await.unwrap();
        assert_eq!(entries[0].entry_date.format("%d").to_string(), "09");
        assert!(entries.iter().all(|e| e.habit_name == "Morning run"));
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut habit = HabitRepository::insert(&store, new_habit(owner, "Run")).await.unwrap();
        habit.id = 999;
        assert!(matches!(
            HabitRepository::update(&store, &habit).await,
            Err(DatabaseError::NotFound(_))
        ));
    }
}
