//! SQL identifier quoting and literal escaping utilities
//!
//! Provides safe quoting for SQL identifiers and string literals used when
//! constructing dynamic SQL (loader COPY statements, data tests, dashboard
//! filters).

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use rp_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("stores"), r#""stores""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `schema.table`).
///
/// # Examples
/// ```
/// use rp_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("analytics.fact_sales"), r#""analytics"."fact_sales""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a potentially schema-qualified table name into (schema, table).
///
/// Uses the last `.` as the separator. If no `.` is present, returns
/// `("main", name)` as the default schema.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    if let Some(pos) = name.rfind('.') {
        (&name[..pos], &name[pos + 1..])
    } else {
        ("main", name)
    }
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a complete single-quoted SQL string literal.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// Render a comma-separated list of string literals for an `IN (...)` clause.
pub fn string_literal_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| string_literal(v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
