use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection, SqlParam, SqlResult};

/// Parameterised SELECT builder for a single table.
///
/// Column names are validated and quoted; values never reach the SQL text,
/// they are returned as typed params for the store to bind.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    alias: Option<String>,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_identifier(&table_name) {
            return Err(FilterError::InvalidIdentifier(table_name));
        }
        Ok(Self {
            table_name,
            alias: None,
            conditions: vec![],
            order_data: vec![],
        })
    }

    pub fn alias(&mut self, alias: &str) -> Result<&mut Self, FilterError> {
        if !is_identifier(alias) {
            return Err(FilterError::InvalidIdentifier(alias.to_string()));
        }
        self.alias = Some(alias.to_string());
        Ok(self)
    }

    pub fn where_op(&mut self, column: &str, operator: FilterOp, data: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.push_condition(column, operator, Some(data.into()))
    }

    pub fn where_eq(&mut self, column: &str, data: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.where_op(column, FilterOp::Eq, data)
    }

    pub fn where_null(&mut self, column: &str) -> Result<&mut Self, FilterError> {
        self.push_condition(column, FilterOp::Null, None)
    }

    pub fn where_not_null(&mut self, column: &str) -> Result<&mut Self, FilterError> {
        self.push_condition(column, FilterOp::NotNull, None)
    }

    fn push_condition(&mut self, column: &str, operator: FilterOp, data: Option<SqlParam>) -> Result<&mut Self, FilterError> {
        check_column(column)?;
        self.conditions.push(FilterWhereInfo { column: column.to_string(), operator, data });
        Ok(self)
    }

    /// Appends terms parsed from `"name asc, id asc"`.
    pub fn order(&mut self, spec: &str) -> Result<&mut Self, FilterError> {
        let terms = FilterOrder::parse(spec)?;
        for term in &terms {
            check_column(&term.column)?;
        }
        self.order_data.extend(terms);
        Ok(self)
    }

    pub fn order_by(&mut self, column: &str, sort: SortDirection) -> Result<&mut Self, FilterError> {
        check_column(column)?;
        self.order_data.push(FilterOrderInfo { column: column.to_string(), sort });
        Ok(self)
    }

    /// `SELECT * FROM <table> WHERE ... ORDER BY ...`
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let mut query = format!("SELECT * FROM {} WHERE {}", self.from_clause(), where_result.query);

        let order = self.to_order_sql()?;
        if !order.is_empty() {
            query.push(' ');
            query.push_str(&order);
        }

        Ok(SqlResult { query, params: where_result.params })
    }

    /// WHERE body without the keyword; params are numbered from $1.
    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(&self.conditions, 0)?;
        Ok(SqlResult { query, params })
    }

    pub fn to_order_sql(&self) -> Result<String, FilterError> {
        FilterOrder::generate(&self.order_data)
    }

    fn from_clause(&self) -> String {
        match &self.alias {
            Some(alias) => format!("\"{}\" AS \"{}\"", self.table_name, alias),
            None => format!("\"{}\"", self.table_name),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `column` or `alias.column`.
fn check_column(column: &str) -> Result<(), FilterError> {
    let parts: Vec<&str> = column.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| is_identifier(p)) {
        return Err(FilterError::InvalidIdentifier(column.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn builds_select_with_numbered_params() {
        let mut filter = Filter::new("habit_entries").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        filter
            .where_eq("user_id", 7i64).unwrap()
            .where_op("entry_date", FilterOp::Gte, day).unwrap()
            .order("entry_date desc").unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"habit_entries\" WHERE \"user_id\" = $1 AND \"entry_date\" >= $2 ORDER BY \"entry_date\" DESC"
        );
        assert_eq!(sql.params, vec![SqlParam::Int(7), SqlParam::Date(day)]);
    }

    #[test]
    fn null_checks_bind_nothing() {
        let mut filter = Filter::new("habits").unwrap();
        filter.where_null("archived_at").unwrap();
        let sql = filter.to_where_sql().unwrap();
        assert_eq!(sql.query, "\"archived_at\" IS NULL");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn qualified_columns_are_quoted_per_part() {
        let mut filter = Filter::new("habit_entries").unwrap();
        filter.alias("e").unwrap().where_eq("e.habit_id", 3i64).unwrap();
        assert_eq!(
            filter.to_sql().unwrap().query,
            "SELECT * FROM \"habit_entries\" AS \"e\" WHERE \"e\".\"habit_id\" = $1"
        );
    }

    #[test]
    fn no_conditions_selects_everything() {
        let filter = Filter::new("habits").unwrap();
        assert_eq!(filter.to_sql().unwrap().query, "SELECT * FROM \"habits\" WHERE 1=1");
    }

    #[test]
    fn null_operators_refuse_a_value() {
        let mut filter = Filter::new("habits").unwrap();
        filter.where_op("archived_at", FilterOp::Null, 1i64).unwrap();
        assert!(matches!(filter.to_where_sql(), Err(FilterError::InvalidClause(_))));
    }

    #[test]
    fn rejects_injected_identifiers() {
        assert!(Filter::new("habits; DROP TABLE habits").is_err());
        let mut filter = Filter::new("habits").unwrap();
        assert!(filter.where_eq("name\" OR 1=1 --", 1i64).is_err());
        assert!(filter.order("name; DELETE").is_err());
        assert!(filter.where_eq("a.b.c", 1i64).is_err());
    }
}
