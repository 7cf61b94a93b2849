use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Which of the paginator's two statements is about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// The counting sub-query that fills in the total element count.
    Count,
    /// The page query with LIMIT/OFFSET/ORDER BY applied.
    Page,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Count => "count",
            QueryKind::Page => "page",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context handed to hooks for each statement the paginator executes.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL as rendered from the statement, before hooks ran.
    pub canonical_sql: String,
    /// SQL that will actually be sent to Postgres.
    pub exec_sql: String,
    pub param_count: usize,
    pub kind: QueryKind,
    /// Tag such as `paginator.count`.
    pub tag: Option<String>,
    /// Low-cardinality fields (page, size) for observability.
    pub fields: BTreeMap<String, String>,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize, kind: QueryKind) -> Self {
        Self {
            canonical_sql: sql.to_string(),
            exec_sql: sql.to_string(),
            param_count,
            kind,
            tag: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.insert(key.into(), value.to_string());
        self
    }
}

/// Outcome of a statement, reported to [`QueryHook::after_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The statement returned this many rows.
    Rows(usize),
    /// The statement failed.
    Error(String),
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Rows(n) => write!(f, "{n} rows"),
            QueryOutcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Action to take after a hook inspected a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Run the statement as is.
    Continue,
    /// Run a different SQL text. Parameters stay the same, so the
    /// replacement must keep the `$n` placeholders.
    ModifySql {
        exec_sql: String,
        canonical_sql: Option<String>,
    },
    /// Do not run the statement; the paginator returns `PageError::Aborted`.
    Abort(String),
}

/// Interception point for the statements the paginator runs.
pub trait QueryHook: Send + Sync {
    /// Called before a statement is executed.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called after a statement finished, successfully or not.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}
