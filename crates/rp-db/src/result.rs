//! Typed query results

use chrono::{Duration, NaiveDate};
use duckdb::types::Value;
use serde::Serialize;
use std::fmt;

/// A single cell read back from the warehouse
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL NULL
    Null,
    /// BOOLEAN
    Bool(bool),
    /// Any integer type that fits in i64
    Int(i64),
    /// Floating point and DECIMAL values
    Float(f64),
    /// Text, dates and anything without a numeric reading
    Text(String),
}

impl CellValue {
    /// Numeric reading of the cell; NULL and text are `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer reading of the cell
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Text reading of the cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Boolean(b) => CellValue::Bool(b),
            Value::TinyInt(i) => CellValue::Int(i.into()),
            Value::SmallInt(i) => CellValue::Int(i.into()),
            Value::Int(i) => CellValue::Int(i.into()),
            Value::BigInt(i) => CellValue::Int(i),
            Value::HugeInt(i) => i64::try_from(i)
                .map(CellValue::Int)
                .unwrap_or(CellValue::Float(i as f64)),
            Value::UTinyInt(i) => CellValue::Int(i.into()),
            Value::USmallInt(i) => CellValue::Int(i.into()),
            Value::UInt(i) => CellValue::Int(i.into()),
            Value::UBigInt(i) => i64::try_from(i)
                .map(CellValue::Int)
                .unwrap_or(CellValue::Float(i as f64)),
            Value::Float(f) => CellValue::Float(f.into()),
            Value::Double(f) => CellValue::Float(f),
            Value::Decimal(d) => {
                let text = d.to_string();
                text.parse::<f64>()
                    .map(CellValue::Float)
                    .unwrap_or(CellValue::Text(text))
            }
            Value::Text(s) => CellValue::Text(s),
            Value::Enum(s) => CellValue::Text(s),
            Value::Date32(days) => date_from_epoch_days(days)
                .map(|d| CellValue::Text(d.to_string()))
                .unwrap_or(CellValue::Int(days.into())),
            other => CellValue::Text(format!("{:?}", other)),
        }
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days.into()))
}

/// Rows and column names of a read query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Row values, one `Vec` per row aligned with `columns`
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResult {
    /// Position of a column by name (case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell at `row` for the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column
    pub fn column_values(&self, column: &str) -> Vec<&CellValue> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Whether the query returned no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_epoch_days() {
        assert_eq!(
            date_from_epoch_days(19875).map(|d| d.to_string()).as_deref(),
            Some("2024-06-01")
        );
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(CellValue::from(Value::Int(7)), CellValue::Int(7));
        assert_eq!(CellValue::from(Value::Null), CellValue::Null);
        assert_eq!(
            CellValue::from(Value::Text("VIP".to_string())).as_str(),
            Some("VIP")
        );
        assert_eq!(CellValue::Float(2.0).as_i64(), Some(2));
        assert_eq!(CellValue::Float(2.5).as_i64(), None);
        assert_eq!(CellValue::Text("x".into()).as_f64(), None);
    }

    #[test]
    fn test_query_result_lookup() {
        let result = QueryResult {
            columns: vec!["category".into(), "revenue".into()],
            rows: vec![
                vec![CellValue::Text("Food".into()), CellValue::Float(10.5)],
                vec![CellValue::Text("Home".into()), CellValue::Null],
            ],
        };
        assert_eq!(result.get(0, "REVENUE"), Some(&CellValue::Float(10.5)));
        assert_eq!(result.column_values("category").len(), 2);
        assert!(result.get(5, "category").is_none());
        assert_eq!(result.len(), 2);
    }
}
