//! Calendar derivations for transactions: day type and time-of-day bucket.
//!
//! Pure functions of the transaction date/time. The SQL renderers emit the
//! same rules for the staging models.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Weekday vs. weekend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Label as stored in the warehouse
    pub fn label(&self) -> &'static str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Weekend => "Weekend",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Label as stored in the warehouse
    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-open hour ranges for the daytime buckets; every other hour is Night.
const HOUR_BUCKETS: [(Range<u32>, TimeOfDay); 3] = [
    (6..12, TimeOfDay::Morning),
    (12..18, TimeOfDay::Afternoon),
    (18..22, TimeOfDay::Evening),
];

/// Saturday and Sunday are weekend days
pub fn day_type(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => DayType::Weekend,
        _ => DayType::Weekday,
    }
}

/// Bucket an hour of the day (0-23)
pub fn time_of_day(hour: u32) -> TimeOfDay {
    HOUR_BUCKETS
        .iter()
        .find(|(range, _)| range.contains(&hour))
        .map(|(_, bucket)| *bucket)
        .unwrap_or(TimeOfDay::Night)
}

/// Bucket a time of day by its hour component
pub fn time_of_day_for(time: NaiveTime) -> TimeOfDay {
    time_of_day(time.hour())
}

/// SQL expression deriving the day type from a DATE expression.
///
/// `isodow` numbers Monday 1 through Sunday 7.
pub fn day_type_sql(date_expr: &str) -> String {
    format!(
        "CASE WHEN isodow({}) IN (6, 7) THEN '{}' ELSE '{}' END",
        date_expr,
        DayType::Weekend.label(),
        DayType::Weekday.label()
    )
}

/// SQL expression deriving the time-of-day bucket from a TIME expression.
///
/// A NULL time yields NULL rather than a bucket.
pub fn time_of_day_sql(time_expr: &str) -> String {
    let hour = format!("date_part('hour', {})", time_expr);
    let mut sql = format!("CASE WHEN {} IS NULL THEN NULL", time_expr);
    for (range, bucket) in HOUR_BUCKETS.iter() {
        sql.push_str(&format!(
            " WHEN {hour} >= {} AND {hour} < {} THEN '{}'",
            range.start,
            range.end,
            bucket.label()
        ));
    }
    sql.push_str(&format!(" ELSE '{}' END", TimeOfDay::Night.label()));
    sql
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
