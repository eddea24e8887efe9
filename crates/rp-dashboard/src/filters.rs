//! Dashboard filters and the SQL predicates they produce

use crate::error::{DashboardError, DashboardResult};
use chrono::{Duration, NaiveDate};
use rp_core::sql_utils::{string_literal, string_literal_list};
use serde::Serialize;

/// Days covered by the default date range, ending at the latest sale
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DashboardResult<Self> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The default window ending at `end`
    pub fn ending_at(end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(DEFAULT_WINDOW_DAYS - 1),
            end,
        }
    }

    fn predicate(&self) -> String {
        format!(
            "transaction_date BETWEEN CAST({} AS DATE) AND CAST({} AS DATE)",
            string_literal(&self.start.to_string()),
            string_literal(&self.end.to_string())
        )
    }
}

/// Dashboard filter selection. An empty list means no filter on that column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filters {
    pub date_range: DateRange,
    pub store_types: Vec<String>,
    pub categories: Vec<String>,
    pub customer_segments: Vec<String>,
}

impl Filters {
    /// Date range only
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            store_types: Vec::new(),
            categories: Vec::new(),
            customer_segments: Vec::new(),
        }
    }

    /// Predicates for the current selection, date range first
    pub fn conditions(&self) -> Vec<String> {
        let mut conditions = vec![self.date_range.predicate()];
        for (column, values) in [
            ("store_type", &self.store_types),
            ("category", &self.categories),
            ("customer_segment", &self.customer_segments),
        ] {
            if !values.is_empty() {
                conditions.push(format!("{} IN ({})", column, string_literal_list(values)));
            }
        }
        conditions
    }

    /// `WHERE` clause combining the filters with panel-specific conditions
    pub fn where_clause(&self, extra: &[&str]) -> String {
        let mut conditions = self.conditions();
        conditions.extend(extra.iter().map(|c| c.to_string()));
        format!("WHERE {}", conditions.join("\n  AND "))
    }
}

/// Values offered for each multi-select filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub store_types: Vec<String>,
    pub categories: Vec<String>,
    pub customer_segments: Vec<String>,
}

impl FilterOptions {
    /// `SELECT DISTINCT` query for one filter column
    pub fn distinct_sql(fact_relation: &str, column: &str) -> String {
        format!(
            "SELECT DISTINCT {column} FROM {fact_relation} WHERE {column} IS NOT NULL ORDER BY {column}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_is_thirty_days_inclusive() {
        let range = DateRange::ending_at(date(2024, 3, 30));
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!((range.end - range.start).num_days() + 1, DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(err.to_string().contains("[B001]"));
        assert!(DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_empty_selection_means_no_filter() {
        let filters = Filters::new(DateRange::ending_at(date(2024, 1, 30)));
        assert_eq!(
            filters.conditions(),
            vec!["transaction_date BETWEEN CAST('2024-01-01' AS DATE) AND CAST('2024-01-30' AS DATE)"]
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let mut filters = Filters::new(DateRange::ending_at(date(2024, 1, 30)));
        filters.categories = vec!["Home".into(), "Kids' Toys".into()];
        filters.customer_segments = vec!["Premium".into()];

        let clause = filters.where_clause(&["category IS NOT NULL"]);
        assert!(clause.starts_with("WHERE transaction_date BETWEEN"));
        assert!(clause.contains("category IN ('Home', 'Kids'' Toys')"));
        assert!(clause.contains("customer_segment IN ('Premium')"));
        assert!(!clause.contains("store_type IN"));
        assert!(clause.ends_with("AND category IS NOT NULL"));
    }

    #[test]
    fn test_distinct_sql() {
        assert_eq!(
            FilterOptions::distinct_sql("analytics.fact_sales", "store_type"),
            "SELECT DISTINCT store_type FROM analytics.fact_sales WHERE store_type IS NOT NULL ORDER BY store_type"
        );
    }
}
