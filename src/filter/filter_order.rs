use super::error::FilterError;
use super::filter_where::quote_column;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `"entry_date desc, id"` into order terms. The direction
    /// defaults to ascending; anything other than asc/desc is an error.
    pub fn parse(spec: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        spec.split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| {
                let words: Vec<&str> = term.split_whitespace().collect();
                let sort = match words.as_slice() {
                    [_] => SortDirection::Asc,
                    [_, dir] if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                    [_, dir] if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                    _ => return Err(FilterError::InvalidClause(format!("Invalid order term: {}", term))),
                };
                Ok(FilterOrderInfo { column: words[0].to_string(), sort })
            })
            .collect()
    }

    /// `ORDER BY ...`, or an empty string when nothing is ordered.
    pub fn generate(terms: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if terms.is_empty() {
            return Ok(String::new());
        }
        let clause = terms
            .iter()
            .map(|t| format!("{} {}", quote_column(&t.column), t.sort.to_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("ORDER BY {}", clause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_terms_with_default_direction() {
        let terms = FilterOrder::parse("name, e.id DESC").unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(
            FilterOrder::generate(&terms).unwrap(),
            "ORDER BY \"name\" ASC, \"e\".\"id\" DESC"
        );
    }

    #[test]
    fn rejects_unknown_directions() {
        assert!(FilterOrder::parse("name sideways").is_err());
        assert!(FilterOrder::parse("name asc extra").is_err());
        assert_eq!(FilterOrder::generate(&[]).unwrap(), "");
    }
}
