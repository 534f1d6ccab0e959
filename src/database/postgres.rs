use async_trait::async_trait;
use sqlx::{postgres::PgArguments, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Habit, HabitEntry, NewHabit, NewHabitEntry};
use crate::database::repository::{EntryRepository, HabitRepository, RepoResult};
use crate::filter::{EntryFilter, HabitFilter, SqlParam, SqlResult};

/// Columns of an entry row plus the joined habit name, over `habit_entries AS e`.
const ENTRY_COLUMNS: &str = "e.id, e.user_id, e.habit_id, h.name AS habit_name, e.entry_date, e.value, e.notes, e.created_at, e.updated_at";

/// PostgreSQL-backed store for habits and entries.
///
/// Table layout lives in `sql/schema.sql`; this type never creates or alters tables.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    log_queries: bool,
}

impl PgStore {
    pub fn new(pool: PgPool, log_queries: bool) -> Self {
        Self { pool, log_queries }
    }

    fn log(&self, sql: &str) {
        if self.log_queries {
            tracing::debug!(target: "habit_api_rust::sql", "{}", sql);
        }
    }

    async fn select_all<T>(&self, sql_result: &SqlResult) -> RepoResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.log(&sql_result.query);
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl HabitRepository for PgStore {
    async fn find_by_owner(&self, owner: Uuid, filter: &HabitFilter) -> RepoResult<Vec<Habit>> {
        let sql_result = filter.to_filter(owner)?.to_sql()?;
        self.select_all(&sql_result).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Habit>> {
        let row = sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, habit: NewHabit) -> RepoResult<Habit> {
        let sql = r#"
            INSERT INTO habits
                (user_id, name, description, habit_type, archived_at, color, goal_value, goal_unit, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING *
        "#;
        self.log(sql);
        let row = sqlx::query_as::<_, Habit>(sql)
            .bind(habit.user_id)
            .bind(habit.name)
            .bind(habit.description)
            .bind(habit.habit_type.as_str())
            .bind(habit.archived_at)
            .bind(habit.color)
            .bind(habit.goal_value)
            .bind(habit.goal_unit)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, habit: &Habit) -> RepoResult<Habit> {
        let sql = r#"
            UPDATE habits SET
                name = $2, description = $3, habit_type = $4, archived_at = $5,
                color = $6, goal_value = $7, goal_unit = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#;
        self.log(sql);
        sqlx::query_as::<_, Habit>(sql)
            .bind(habit.id)
            .bind(&habit.name)
            .bind(&habit.description)
            .bind(habit.habit_type.as_str())
            .bind(habit.archived_at)
            .bind(&habit.color)
            .bind(habit.goal_value)
            .bind(&habit.goal_unit)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("habit {}", habit.id)))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;
        let entries = sqlx::query("DELETE FROM habit_entries WHERE habit_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let habits = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if entries.rows_affected() > 0 {
            tracing::debug!("Deleted {} entries of habit {}", entries.rows_affected(), id);
        }
        Ok(habits.rows_affected() > 0)
    }

    async fn health_check(&self) -> RepoResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl EntryRepository for PgStore {
    async fn find_by_owner(&self, owner: Uuid, filter: &EntryFilter) -> RepoResult<Vec<HabitEntry>> {
        let filter = filter.to_filter(owner)?;
        let where_result = filter.to_where_sql()?;
        let query = format!(
            "SELECT {} FROM habit_entries AS e JOIN habits AS h ON h.id = e.habit_id WHERE {} {}",
            ENTRY_COLUMNS,
            where_result.query,
            filter.to_order_sql()?
        );
        self.select_all(&SqlResult { query, params: where_result.params }).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<HabitEntry>> {
        let sql = format!(
            "SELECT {} FROM habit_entries AS e JOIN habits AS h ON h.id = e.habit_id WHERE e.id = $1",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, HabitEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, entry: NewHabitEntry) -> RepoResult<HabitEntry> {
        let sql = format!(
            r#"
            WITH e AS (
                INSERT INTO habit_entries (user_id, habit_id, entry_date, value, notes, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
                RETURNING *
            )
            SELECT {} FROM e JOIN habits AS h ON h.id = e.habit_id
            "#,
            ENTRY_COLUMNS
        );
        self.log(&sql);
        let row = sqlx::query_as::<_, HabitEntry>(&sql)
            .bind(entry.user_id)
            .bind(entry.habit_id)
            .bind(entry.entry_date)
            .bind(entry.value)
            .bind(entry.notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, entry: &HabitEntry) -> RepoResult<HabitEntry> {
        let sql = format!(
            r#"
            WITH e AS (
                UPDATE habit_entries SET
                    habit_id = $2, entry_date = $3, value = $4, notes = $5, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {} FROM e JOIN habits AS h ON h.id = e.habit_id
            "#,
            ENTRY_COLUMNS
        );
        self.log(&sql);
        sqlx::query_as::<_, HabitEntry>(&sql)
            .bind(entry.id)
            .bind(entry.habit_id)
            .bind(entry.entry_date)
            .bind(entry.value)
            .bind(&entry.notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("entry {}", entry.id)))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM habit_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Date(d) => q.bind(*d),
    }
}
