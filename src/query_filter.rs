//! Builds SQL filter clauses whose values are always bound as parameters.

use rusqlite::types::Value;

use crate::date_window::DateWindow;

/// A conjunction of SQL conditions and the values bound to their `?` placeholders.
///
/// Conditions are joined with `AND` in the order they were pushed, and
/// [Filter::values] yields the bound values in that same order, so the result
/// can be passed straight to [rusqlite::params_from_iter].
#[derive(Debug, Default, Clone)]
pub struct Filter {
    conditions: Vec<String>,
    values: Vec<Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `condition`, which must contain exactly one `?` placeholder for `value`.
    pub fn push(&mut self, condition: &str, value: impl Into<Value>) -> &mut Self {
        self.conditions.push(condition.to_owned());
        self.values.push(value.into());
        self
    }

    /// Restrict `column` to the inclusive bounds of `window`.
    ///
    /// Open ends of the window add no condition.
    pub fn push_window(&mut self, column: &str, window: &DateWindow) -> &mut Self {
        if let Some(start) = window.start {
            self.push(&format!("{column} >= ?"), start.to_string());
        }

        if let Some(end) = window.end {
            self.push(&format!("{column} <= ?"), end.to_string());
        }

        self
    }

    /// The conditions as a `WHERE` clause, or an empty string if there are none.
    pub fn where_clause(&self) -> String {
        self.clause("WHERE")
    }

    /// The conditions as a continuation of an existing `WHERE` or `ON` clause.
    pub fn and_clause(&self) -> String {
        self.clause("AND")
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn clause(&self, keyword: &str) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" {keyword} {}", self.conditions.join(" AND "))
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::{Connection, params_from_iter, types::Value};
    use time::macros::date;

    use crate::date_window::DateWindow;

    use super::Filter;

    #[test]
    fn empty_filter_adds_nothing() {
        let filter = Filter::new();

        assert_eq!(filter.where_clause(), "");
        assert_eq!(filter.and_clause(), "");
        assert!(filter.values().is_empty());
    }

    #[test]
    fn window_with_both_ends_adds_two_conditions() {
        let mut filter = Filter::new();
        filter.push_window(
            "transaction_date",
            &DateWindow {
                start: Some(date!(2024 - 01 - 01)),
                end: Some(date!(2024 - 03 - 31)),
            },
        );

        assert_eq!(
            filter.where_clause(),
            " WHERE transaction_date >= ? AND transaction_date <= ?"
        );
        assert_eq!(
            filter.values(),
            [
                Value::Text("2024-01-01".to_owned()),
                Value::Text("2024-03-31".to_owned())
            ]
        );
    }

    #[test]
    fn values_are_bound_not_interpolated() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE ward (name TEXT)", ())
            .unwrap();
        connection
            .execute("INSERT INTO ward (name) VALUES ('A'), ('B')", ())
            .unwrap();

        let mut filter = Filter::new();
        filter.push("name = ?", "A' OR '1'='1".to_owned());
        let query = format!("SELECT COUNT(*) FROM ward{}", filter.where_clause());

        let count: i64 = connection
            .query_row(&query, params_from_iter(filter.values()), |row| row.get(0))
            .unwrap();

        assert_eq!(count, 0);
    }
}
