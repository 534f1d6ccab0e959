use chrono::NaiveDate;
use uuid::Uuid;

/// Operators the list filters compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    Null,
    NotNull,
}

impl FilterOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Null => "IS NULL",
            FilterOp::NotNull => "IS NOT NULL",
        }
    }

    /// Null checks stand alone; every other operator compares against a bound value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOp::Null | FilterOp::NotNull)
    }
}

/// A typed bind parameter. Keeping the type lets the store bind dates and
/// uuids natively instead of comparing a column against text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Uuid(Uuid),
    Date(NaiveDate),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self { SqlParam::Int(v) }
}

impl From<Uuid> for SqlParam {
    fn from(v: Uuid) -> Self { SqlParam::Uuid(v) }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self { SqlParam::Date(v) }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    /// `None` for `IS NULL` / `IS NOT NULL`.
    pub data: Option<SqlParam>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
