//! SELECT statement that pagination is applied to.

use super::filter::{Filter, render_and};
use super::param::{Param, ParamList};
use crate::error::{PageError, PageResult};
use crate::modifier::StatementModifier;
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

/// Alias of the derived table wrapped by grouped/distinct count queries.
const COUNT_ALIAS: &str = "pagination_count";

/// A SELECT statement built clause by clause.
///
/// The clauses are kept apart (instead of as one SQL string) so that the
/// paginator can derive a counting sub-query that shares the FROM, JOIN,
/// WHERE, GROUP BY and DISTINCT of the original while dropping ORDER BY,
/// LIMIT and OFFSET.
#[derive(Clone, Debug)]
pub struct SelectStatement {
    /// Table or FROM expression
    from_expr: String,
    /// SELECT columns (default ["*"])
    columns: Vec<String>,
    /// SELECT DISTINCT
    distinct: bool,
    /// JOIN clauses
    joins: Vec<String>,
    /// WHERE conditions, joined by AND
    filters: Vec<Filter>,
    /// GROUP BY clause
    group_by: Option<String>,
    /// ORDER BY clauses
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Monitoring tag
    tag: Option<String>,
    /// First error recorded while building
    build_error: Option<String>,
}

impl SelectStatement {
    /// Start a `SELECT * FROM <from_expr>` statement.
    pub fn new(from_expr: &str) -> Self {
        Self {
            from_expr: from_expr.to_string(),
            columns: vec!["*".to_string()],
            distinct: false,
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            tag: None,
            build_error: None,
        }
    }

    // ==================== SELECT columns ====================

    /// Replace the SELECT list (string form, supports expressions).
    pub fn select(mut self, cols: &str) -> Self {
        self.columns = vec![cols.to_string()];
        self
    }

    /// Replace the SELECT list (array form).
    pub fn select_cols(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Use `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== JOIN ====================

    pub fn inner_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("INNER JOIN {table} ON {on}"));
        self
    }

    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("LEFT JOIN {table} ON {on}"));
        self
    }

    // ==================== WHERE ====================

    /// column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.filter(Filter::compare(column, "=", Param::new(value)))
    }

    /// column != value
    pub fn ne<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.filter(Filter::compare(column, "!=", Param::new(value)))
    }

    /// column > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.filter(Filter::compare(column, ">", Param::new(value)))
    }

    /// column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.filter(Filter::compare(column, ">=", Param::new(value)))
    }

    /// column < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.filter(Filter::compare(column, "<", Param::new(value)))
    }

    /// column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.filter(Filter::compare(column, "<=", Param::new(value)))
    }

    /// column LIKE pattern
    pub fn like<T: ToSql + Send + Sync + 'static>(self, column: &str, pattern: T) -> Self {
        self.filter(Filter::compare(column, "LIKE", Param::new(pattern)))
    }

    /// column ILIKE pattern
    pub fn ilike<T: ToSql + Send + Sync + 'static>(self, column: &str, pattern: T) -> Self {
        self.filter(Filter::compare(column, "ILIKE", Param::new(pattern)))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(Filter::NullCheck {
            column: column.to_string(),
            is_null: true,
        })
    }

    pub fn is_not_null(self, column: &str) -> Self {
        self.filter(Filter::NullCheck {
            column: column.to_string(),
            is_null: false,
        })
    }

    /// column IN (values...)
    pub fn in_list<T: ToSql + Send + Sync + 'static>(self, column: &str, values: Vec<T>) -> Self {
        self.filter(Filter::InList {
            column: column.to_string(),
            values: values.into_iter().map(Param::new).collect(),
        })
    }

    /// Raw WHERE condition without params.
    pub fn where_raw(self, sql: &str) -> Self {
        self.filter(Filter::Raw(sql.to_string()))
    }

    /// WHERE condition with `?` placeholders, e.g. `"price > ? OR code = ?"`.
    pub fn where_template<T: ToSql + Send + Sync + 'static>(
        mut self,
        sql: &str,
        values: Vec<T>,
    ) -> Self {
        match Filter::template(sql, values.into_iter().map(Param::new).collect()) {
            Ok(filter) => self.filter(filter),
            Err(err) => {
                self.build_error.get_or_insert(err);
                self
            }
        }
    }

    fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    // ==================== Grouping, ordering, limits ====================

    pub fn group_by(mut self, clause: &str) -> Self {
        self.group_by = Some(clause.to_string());
        self
    }

    /// Append an ORDER BY clause.
    pub fn order_by(mut self, clause: &str) -> Self {
        self.push_order_by(clause);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.set_limit(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.set_offset(n);
        self
    }

    /// Associate a tag for monitoring/observability.
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    // In-place setters used by statement modifiers.

    pub fn push_order_by(&mut self, clause: &str) -> &mut Self {
        if !clause.is_empty() {
            self.order_by.push(clause.to_string());
        }
        self
    }

    pub fn set_limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn set_offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Run a [`StatementModifier`] over this statement.
    pub fn apply(mut self, modifier: &impl StatementModifier) -> Self {
        modifier.modify_statement(&mut self);
        self
    }

    // ==================== Inspection ====================

    pub fn get_tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    // ==================== Build ====================

    fn validate(&self) -> PageResult<()> {
        if let Some(err) = &self.build_error {
            return Err(PageError::Validation(err.clone()));
        }
        if self.from_expr.trim().is_empty() {
            return Err(PageError::validation("SelectStatement: empty FROM expression"));
        }
        for (clause, value) in [("LIMIT", self.limit), ("OFFSET", self.offset)] {
            if value.is_some_and(|n| i64::try_from(n).is_err()) {
                return Err(PageError::validation(format!(
                    "SelectStatement: {clause} exceeds bigint range"
                )));
            }
        }
        if self.columns.iter().all(|c| c.trim().is_empty()) {
            return Err(PageError::validation("SelectStatement: empty SELECT list"));
        }
        Ok(())
    }

    fn projection(&self) -> String {
        let cols = self.columns.join(", ");
        if self.distinct {
            format!("DISTINCT {cols}")
        } else {
            cols
        }
    }

    /// `FROM ... JOIN ... WHERE ... GROUP BY ...`, shared by both queries.
    fn render_body(&self, sql: &mut String, params: &mut ParamList) {
        let _ = write!(sql, " FROM {}", self.from_expr);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        let mut where_sql = String::new();
        if render_and(&self.filters, &mut where_sql, params) {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if let Some(group) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }
    }

    /// Render the statement with `$n` placeholders and its parameters.
    pub fn build(&self) -> PageResult<(String, ParamList)> {
        self.validate()?;
        Ok(self.render_select())
    }

    fn render_select(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut sql = format!("SELECT {}", self.projection());
        self.render_body(&mut sql, &mut params);

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }
        (sql, params)
    }

    /// Render the counting sub-query for this statement.
    ///
    /// Grouped or distinct statements are wrapped in a derived table so the
    /// count reflects result rows rather than base-table rows.
    pub fn build_count(&self) -> PageResult<(String, ParamList)> {
        self.validate()?;
        Ok(self.render_count())
    }

    fn render_count(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        if self.distinct || self.group_by.is_some() {
            let inner = if self.distinct {
                self.projection()
            } else {
                "1".to_string()
            };
            let mut sql = format!("SELECT COUNT(*) FROM (SELECT {inner}");
            self.render_body(&mut sql, &mut params);
            let _ = write!(sql, ") AS {COUNT_ALIAS}");
            (sql, params)
        } else {
            let mut sql = String::from("SELECT COUNT(*)");
            self.render_body(&mut sql, &mut params);
            (sql, params)
        }
    }

    /// The page SQL (for debugging).
    pub fn to_sql(&self) -> String {
        self.render_select().0
    }

    /// The counting SQL (for debugging).
    pub fn to_count_sql(&self) -> String {
        self.render_count().0
    }
}
