//! WHERE conditions of a [`SelectStatement`](super::SelectStatement).
//!
//! Placeholders are numbered while rendering, so the same filters produce
//! correct `$n` indices both in the page query and in the counting sub-query.

use super::param::{Param, ParamList};
use std::fmt::Write as _;

/// A single WHERE condition. Conditions of a statement are joined with `AND`.
#[derive(Clone, Debug)]
pub enum Filter {
    /// `column <op> $n`
    Compare {
        column: String,
        op: &'static str,
        value: Param,
    },

    /// `column IS [NOT] NULL`
    NullCheck { column: String, is_null: bool },

    /// `column IN ($n, ...)`; an empty list renders as `1=0`.
    InList { column: String, values: Vec<Param> },

    /// SQL with `?` placeholders replaced by `$n` in order.
    ///
    /// `?` inside `'...'` literals and `"..."` identifiers is left alone. The
    /// jsonb operators `?`, `?|` and `?&` cannot be written in a template; use
    /// `jsonb_exists`/`jsonb_exists_any`/`jsonb_exists_all` or a raw filter.
    Template { sql: String, params: Vec<Param> },

    /// Raw SQL without parameters, rendered verbatim.
    Raw(String),
}

impl Filter {
    pub(crate) fn compare(column: &str, op: &'static str, value: Param) -> Self {
        Filter::Compare {
            column: column.to_string(),
            op,
            value,
        }
    }

    /// Build a template filter, checking that the `?` count matches the values.
    pub(crate) fn template(sql: &str, params: Vec<Param>) -> Result<Self, String> {
        let placeholders = split_placeholders(sql).len() - 1;
        if placeholders != params.len() {
            return Err(format!(
                "where_template: placeholders({placeholders}) != params({}) in `{sql}`",
                params.len()
            ));
        }
        Ok(Filter::Template {
            sql: sql.to_string(),
            params,
        })
    }

    pub(crate) fn render(&self, sql: &mut String, params: &mut ParamList) {
        match self {
            Filter::Compare { column, op, value } => {
                let idx = params.push_param(value.clone());
                let _ = write!(sql, "{column} {op} ${idx}");
            }
            Filter::NullCheck { column, is_null } => {
                sql.push_str(column);
                sql.push_str(if *is_null { " IS NULL" } else { " IS NOT NULL" });
            }
            Filter::InList { column, values } => {
                if values.is_empty() {
                    sql.push_str("1=0");
                    return;
                }
                let _ = write!(sql, "{column} IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    let idx = params.push_param(value.clone());
                    let _ = write!(sql, "${idx}");
                }
                sql.push(')');
            }
            Filter::Template { sql: template, params: values } => {
                // Piece count was checked against the values at construction.
                for (i, piece) in split_placeholders(template).into_iter().enumerate() {
                    if i > 0 {
                        if let Some(value) = values.get(i - 1) {
                            let idx = params.push_param(value.clone());
                            let _ = write!(sql, "${idx}");
                        }
                    }
                    sql.push_str(piece);
                }
            }
            Filter::Raw(raw) => sql.push_str(raw),
        }
    }

    /// Whether the filter must be parenthesized when joined with `AND`.
    pub(crate) fn needs_parens(&self) -> bool {
        matches!(self, Filter::Template { .. } | Filter::Raw(_))
    }
}

/// Split a template at its `?` placeholders, skipping quoted sections.
/// Always returns at least one piece.
fn split_placeholders(sql: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quote = None;
    let mut start = 0;
    for (i, ch) in sql.char_indices() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), _) if q == ch => quote = None,
            (None, '?') => {
                pieces.push(&sql[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&sql[start..]);
    pieces
}

/// Render `filters` joined by `AND`. Returns `false` if there was nothing to render.
pub(crate) fn render_and(filters: &[Filter], sql: &mut String, params: &mut ParamList) -> bool {
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        let parens = filters.len() > 1 && filter.needs_parens();
        if parens {
            sql.push('(');
        }
        filter.render(sql, params);
        if parens {
            sql.push(')');
        }
    }
    !filters.is_empty()
}
