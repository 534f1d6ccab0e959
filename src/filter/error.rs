use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    /// Table, alias or column name that is not a plain SQL identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid clause: {0}")]
    InvalidClause(String),

    /// Client-supplied query parameter that is not a calendar date.
    #[error("Invalid date for '{param}': {value} (expected YYYY-MM-DD)")]
    InvalidDate { param: String, value: String },
}
