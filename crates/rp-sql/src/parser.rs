//! SQL parser wrapper

use crate::dialect::{DuckDbDialect, SqlDialect};
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;

/// SQL parser that wraps sqlparser-rs with dialect support
pub struct SqlParser {
    dialect: Box<dyn SqlDialect>,
}

impl SqlParser {
    /// Create a new parser with DuckDB dialect
    pub fn duckdb() -> Self {
        Self {
            dialect: Box::new(DuckDbDialect::new()),
        }
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        self.dialect.parse(sql)
    }

    /// Parse a model body, which must be exactly one query
    pub fn parse_model_query(&self, sql: &str) -> SqlResult<Statement> {
        let mut stmts = self.parse(sql)?;
        if stmts.len() != 1 {
            return Err(SqlError::UnsupportedStatement(format!(
                "expected a single SELECT, found {} statements",
                stmts.len()
            )));
        }
        let stmt = stmts.remove(0);
        match stmt {
            Statement::Query(_) => Ok(stmt),
            other => Err(SqlError::UnsupportedStatement(
                other.to_string().split_whitespace().next().unwrap_or("").to_uppercase(),
            )),
        }
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::duckdb()
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
