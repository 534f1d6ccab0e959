use super::error::FilterError;
use super::types::{FilterWhereInfo, SqlParam};

/// Renders a list of AND-combined conditions into a parameterised clause.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = quote_column(&condition.column);
        let op = condition.operator;
        match (&condition.data, op.takes_value()) {
            (None, false) => Ok(format!("{} {}", quoted_column, op.to_sql())),
            (Some(value), true) => Ok(format!("{} {} {}", quoted_column, op.to_sql(), self.param(value.clone()))),
            (None, true) => Err(FilterError::InvalidClause(format!(
                "{} needs a value for column {}",
                op.to_sql(),
                condition.column
            ))),
            (Some(_), false) => Err(FilterError::InvalidClause(format!(
                "{} takes no value for column {}",
                op.to_sql(),
                condition.column
            ))),
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Quotes a column, keeping an optional table alias prefix: `e.entry_date` -> `"e"."entry_date"`.
pub fn quote_column(column: &str) -> String {
    column
        .split('.')
        .map(|part| format!("\"{}\"", part))
        .collect::<Vec<_>>()
        .join(".")
}
