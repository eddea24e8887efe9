//! Terminal and JSON rendering of dashboard snapshots

use crate::dashboard::{DashboardSnapshot, PanelData};
use crate::error::DashboardResult;
use crate::panels::PanelKind;
use rp_db::{CellValue, QueryResult};

/// Width of the longest bar in a bar panel
const BAR_WIDTH: usize = 40;

const EMPTY_PANEL: &str = "No data available";

/// Render a snapshot as plain text for the terminal
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let filters = &snapshot.filters;
    let mut lines = vec![
        "Retail Analytics Dashboard".to_string(),
        format!(
            "Period: {} to {}",
            filters.date_range.start, filters.date_range.end
        ),
        format!(
            "Store types: {} | Categories: {} | Segments: {}",
            selection(&filters.store_types),
            selection(&filters.categories),
            selection(&filters.customer_segments)
        ),
        format!(
            "Generated: {}",
            snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];

    for panel in &snapshot.panels {
        lines.push(String::new());
        lines.extend(render_panel(panel));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Render a snapshot as pretty-printed JSON
pub fn render_json(snapshot: &DashboardSnapshot) -> DashboardResult<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

fn selection(values: &[String]) -> String {
    if values.is_empty() {
        "All".to_string()
    } else {
        values.join(", ")
    }
}

fn render_panel(panel: &PanelData) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", panel.title)];
    let result = panel.result.as_ref();
    if result.is_empty() {
        lines.push(EMPTY_PANEL.to_string());
        return lines;
    }

    match panel.panel.kind() {
        PanelKind::Metrics => lines.extend(render_metrics(result)),
        PanelKind::Bars { label, value } => lines.extend(render_bars(result, label, value)),
        PanelKind::Table => lines.extend(render_table(result)),
    }
    lines
}

/// One `label  value` line per column of the first row
fn render_metrics(result: &QueryResult) -> Vec<String> {
    let Some(row) = result.rows.first() else {
        return Vec::new();
    };
    let labels: Vec<String> = result.columns.iter().map(|c| humanize(c)).collect();
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(0);

    labels
        .iter()
        .zip(&result.columns)
        .zip(row)
        .map(|((label, column), cell)| {
            format!("{:<width$}  {}", label, format_cell(column, cell), width = width)
        })
        .collect()
}

fn render_bars(result: &QueryResult, label: &str, value: &str) -> Vec<String> {
    let (Some(label_idx), Some(value_idx)) = (result.column_index(label), result.column_index(value))
    else {
        return render_table(result);
    };

    let max = result
        .rows
        .iter()
        .filter_map(|r| r.get(value_idx).and_then(CellValue::as_f64))
        .fold(0.0_f64, f64::max);
    let label_width = result
        .rows
        .iter()
        .filter_map(|r| r.get(label_idx))
        .map(|c| c.to_string().chars().count())
        .max()
        .unwrap_or(0);

    result
        .rows
        .iter()
        .map(|row| {
            let name = row.get(label_idx).map(|c| c.to_string()).unwrap_or_default();
            let amount = row.get(value_idx).and_then(CellValue::as_f64).unwrap_or(0.0);
            let bar = "█".repeat(bar_length(amount, max));
            let mut line = format!(
                "{:<label_width$}  {:<bar_width$}  {}",
                name,
                bar,
                format_cell(value, &CellValue::Float(amount)),
                label_width = label_width,
                bar_width = BAR_WIDTH
            );
            let extras: Vec<String> = result
                .columns
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != label_idx && *i != value_idx)
                .filter_map(|(i, column)| {
                    row.get(i)
                        .map(|cell| format!("{}: {}", column, format_cell(column, cell)))
                })
                .collect();
            if !extras.is_empty() {
                line.push_str(&format!("  ({})", extras.join(", ")));
            }
            line.trim_end().to_string()
        })
        .collect()
}

fn bar_length(amount: f64, max: f64) -> usize {
    if max <= 0.0 || amount <= 0.0 {
        return 0;
    }
    ((amount / max) * BAR_WIDTH as f64).round() as usize
}

/// Column-aligned table with a dashed separator under the headers
fn render_table(result: &QueryResult) -> Vec<String> {
    let headers: Vec<&str> = result.columns.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&result.columns)
                .map(|(cell, column)| format_cell(column, cell))
                .collect()
        })
        .collect();
    table_lines(&headers, &rows)
}

fn table_lines(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let pad = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![pad(headers.iter().map(|h| h.to_string()).collect())];
    lines.push(pad(widths.iter().map(|&w| "-".repeat(w)).collect()));
    lines.extend(rows.iter().map(|row| pad(row.clone())));
    lines
}

fn is_money_column(column: &str) -> bool {
    ["revenue", "profit", "amount", "value"]
        .iter()
        .any(|k| column.contains(k))
}

fn format_cell(column: &str, cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "-".to_string(),
        CellValue::Int(i) => group_thousands(*i),
        CellValue::Float(f) if is_money_column(column) => format_money(*f),
        CellValue::Float(f) => format!("{:.2}", f),
        other => other.to_string(),
    }
}

/// `snake_case` column name as a label
fn humanize(column: &str) -> String {
    let spaced = column.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `1234567` as `1,234,567`
pub(crate) fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// `1234.5` as `$1,234.50`
pub(crate) fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
