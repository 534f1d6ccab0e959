//! Query-string filters for the list endpoints.
//!
//! Each filter is parsed once from the request and then either compiled to a
//! SQL [`Filter`] or evaluated directly against records, so every store
//! applies identical semantics.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::error::FilterError;
use super::filter::Filter;
use super::types::{FilterOp, SortDirection};
use crate::database::models::{Habit, HabitEntry};

pub const HABITS_TABLE: &str = "habits";
pub const ENTRIES_TABLE: &str = "habit_entries";
/// Alias the entry list query uses for `habit_entries` when joining habits.
pub const ENTRIES_ALIAS: &str = "e";

/// Raw `?archived=` parameter of `GET /habits`.
#[derive(Debug, Default, Deserialize)]
pub struct HabitListQuery {
    pub archived: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchivedFilter {
    #[default]
    Active,
    Archived,
}

impl ArchivedFilter {
    /// `true`/`1` select archived habits, `false`/`0` active ones. Anything
    /// else, including absence, falls back to active.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "true" || v == "1" => ArchivedFilter::Archived,
            _ => ArchivedFilter::Active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitFilter {
    pub archived: ArchivedFilter,
}

impl HabitFilter {
    pub fn from_query(query: &HabitListQuery) -> Self {
        Self {
            archived: ArchivedFilter::parse(query.archived.as_deref()),
        }
    }

    pub fn to_filter(&self, owner: Uuid) -> Result<Filter, FilterError> {
        let mut filter = Filter::new(HABITS_TABLE)?;
        filter.where_eq("user_id", owner)?;
        match self.archived {
            ArchivedFilter::Active => filter.where_null("archived_at")?,
            ArchivedFilter::Archived => filter.where_not_null("archived_at")?,
        };
        filter.order("name asc, id asc")?;
        Ok(filter)
    }

    /// Predicate part only; owner scoping is the caller's job.
    pub fn matches(&self, habit: &Habit) -> bool {
        match self.archived {
            ArchivedFilter::Active => !habit.is_archived(),
            ArchivedFilter::Archived => habit.is_archived(),
        }
    }
}

/// Raw parameters of `GET /entries`.
#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    pub habit_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,
}

/// AND-combined entry predicates. Range and exact-day clauses all apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub habit_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn from_query(query: &EntryListQuery) -> Result<Self, FilterError> {
        Ok(Self {
            // A non-numeric habit id drops the clause instead of failing the request
            habit_id: non_empty(query.habit_id.as_deref()).and_then(|v| v.parse().ok()),
            start_date: parse_date("start_date", query.start_date.as_deref())?,
            end_date: parse_date("end_date", query.end_date.as_deref())?,
            date: parse_date("date", query.date.as_deref())?,
        })
    }

    pub fn to_filter(&self, owner: Uuid) -> Result<Filter, FilterError> {
        let column = |name: &str| format!("{}.{}", ENTRIES_ALIAS, name);

        let mut filter = Filter::new(ENTRIES_TABLE)?;
        filter.alias(ENTRIES_ALIAS)?;
        filter.where_eq(&column("user_id"), owner)?;
        if let Some(habit_id) = self.habit_id {
            filter.where_eq(&column("habit_id"), habit_id)?;
        }
        if let Some(start) = self.start_date {
            filter.where_op(&column("entry_date"), FilterOp::Gte, start)?;
        }
        if let Some(end) = self.end_date {
            filter.where_op(&column("entry_date"), FilterOp::Lte, end)?;
        }
        if let Some(day) = self.date {
            filter.where_eq(&column("entry_date"), day)?;
        }
        filter.order_by(&column("entry_date"), SortDirection::Desc)?;
        filter.order_by(&column("id"), SortDirection::Desc)?;
        Ok(filter)
    }

    pub fn matches(&self, entry: &HabitEntry) -> bool {
        self.habit_id.map_or(true, |id| entry.habit_id == id)
            && self.start_date.map_or(true, |start| entry.entry_date >= start)
            && self.end_date.map_or(true, |end| entry.entry_date <= end)
            && self.date.map_or(true, |day| entry.entry_date == day)
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(param: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FilterError::InvalidDate {
                param: param.to_string(),
                value: value.to_string(),
            }),
    }
}
