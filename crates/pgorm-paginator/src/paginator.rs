//! The paginator plugin: counts, applies pagination, fetches a page.
//!
//! ```ignore
//! use pgorm_paginator::{Order, Pagination, Paginator, select};
//!
//! let paginator = Paginator::new();
//! let pagination = Pagination::of(0, 20)?.with_sort(Order::desc("created_at")?);
//!
//! let stmt = select("products").gt("price", 10i64);
//! let page: Page<Product> = paginator.fetch_page(&client, &stmt, &pagination).await?;
//!
//! println!("{} of {} pages", page.metadata().page + 1, pagination.total_pages());
//! ```

use crate::client::GenericClient;
use crate::config::PaginatorConfig;
use crate::error::{PageError, PageResult};
use crate::hook::{HookAction, QueryContext, QueryHook, QueryKind, QueryOutcome};
use crate::page::Page;
use crate::pagination::Pagination;
use crate::row::{FromRow, count_from_row};
use crate::statement::{ParamList, SelectStatement};
use std::sync::Arc;
use std::time::Instant;
use tokio_postgres::Row;

/// Runs paginated queries against any [`GenericClient`].
///
/// For each request the paginator:
/// 1. rejects sizes above [`PaginatorConfig::max_page_size`];
/// 2. runs the counting sub-query (unless counting is disabled or the
///    pagination already carries a total) and records the total;
/// 3. applies the pagination to a clone of the statement and fetches the rows.
///
/// Unpaged requests skip the counting query: the fetched rows are the total.
#[derive(Clone, Default)]
pub struct Paginator {
    config: PaginatorConfig,
    hook: Option<Arc<dyn QueryHook>>,
}

impl Paginator {
    /// Name of the plugin, used as the default tag prefix.
    pub const NAME: &'static str = "paginator";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PaginatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Fetch one page of `stmt` and fill in the pagination's total.
    pub async fn fetch_page<T, C>(
        &self,
        conn: &C,
        stmt: &SelectStatement,
        pagination: &Pagination,
    ) -> PageResult<Page<T>>
    where
        T: FromRow,
        C: GenericClient,
    {
        self.check_size(pagination)?;

        let needs_total = self.config.count_total && !pagination.is_total_elements_set();
        if needs_total && !pagination.is_unpaged() {
            let total = self.run_count(conn, stmt, pagination).await?;
            record_total(pagination, total);
        }

        let page_stmt = stmt.clone().apply(pagination);
        let (sql, params) = page_stmt.build()?;
        let rows = self
            .execute(conn, stmt, pagination, QueryKind::Page, sql, &params)
            .await?;

        if needs_total && pagination.is_unpaged() {
            record_total(pagination, rows.len() as u64);
        }

        let items = rows.iter().map(T::from_row).collect::<PageResult<Vec<_>>>()?;
        tracing::debug!(
            target: "pgorm_paginator",
            page = pagination.page(),
            size = pagination.size(),
            items = items.len(),
            total_elements = pagination.total_elements(),
            "fetched page"
        );
        Ok(Page::new(items, pagination.metadata()))
    }

    /// Run only the counting sub-query for `stmt`.
    ///
    /// Always queries the database; the result is recorded on `pagination`
    /// if it has no total yet.
    pub async fn count<C: GenericClient>(
        &self,
        conn: &C,
        stmt: &SelectStatement,
        pagination: &Pagination,
    ) -> PageResult<u64> {
        let total = self.run_count(conn, stmt, pagination).await?;
        record_total(pagination, total);
        Ok(total)
    }

    fn check_size(&self, pagination: &Pagination) -> PageResult<()> {
        match self.config.max_page_size {
            Some(max) if pagination.size() > max => Err(PageError::PageSizeTooLarge {
                size: pagination.size(),
                max,
            }),
            _ => Ok(()),
        }
    }

    async fn run_count<C: GenericClient>(
        &self,
        conn: &C,
        stmt: &SelectStatement,
        pagination: &Pagination,
    ) -> PageResult<u64> {
        let (sql, params) = stmt.build_count()?;
        let rows = self
            .execute(conn, stmt, pagination, QueryKind::Count, sql, &params)
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| PageError::not_found("count query returned no rows"))?;
        count_from_row(row)
    }

    fn tag_for(&self, stmt: &SelectStatement, kind: QueryKind) -> String {
        let prefix = stmt.get_tag().unwrap_or(&self.config.tag_prefix);
        format!("{prefix}.{kind}")
    }

    /// Run one statement through the hook, the timeout and the client.
    async fn execute<C: GenericClient>(
        &self,
        conn: &C,
        stmt: &SelectStatement,
        pagination: &Pagination,
        kind: QueryKind,
        sql: String,
        params: &ParamList,
    ) -> PageResult<Vec<Row>> {
        let tag = self.tag_for(stmt, kind);
        let mut ctx = QueryContext::new(&sql, params.len(), kind)
            .with_tag(tag.clone())
            .with_field("page", pagination.page())
            .with_field("size", pagination.size());

        if let Some(hook) = &self.hook {
            match hook.before_query(&ctx) {
                HookAction::Continue => {}
                HookAction::ModifySql {
                    exec_sql,
                    canonical_sql,
                } => {
                    ctx.exec_sql = exec_sql;
                    if let Some(canonical_sql) = canonical_sql {
                        ctx.canonical_sql = canonical_sql;
                    }
                }
                HookAction::Abort(reason) => {
                    tracing::debug!(target: "pgorm_paginator", %kind, %tag, %reason, "query aborted by hook");
                    return Err(PageError::Aborted(reason));
                }
            }
        }

        let refs = params.as_refs();
        let start = Instant::now();
        let fut = conn.query_tagged(&tag, &ctx.exec_sql, &refs);
        let result = match self.config.query_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(PageError::Timeout(timeout)),
            },
            None => fut.await,
        };
        let elapsed = start.elapsed();

        if let Some(hook) = &self.hook {
            let outcome = match &result {
                Ok(rows) => QueryOutcome::Rows(rows.len()),
                Err(err) => QueryOutcome::Error(err.to_string()),
            };
            hook.after_query(&ctx, elapsed, &outcome);
        }
        if let Err(err) = &result {
            tracing::warn!(target: "pgorm_paginator", %kind, %tag, error = %err, "paginated query failed");
        }
        result
    }
}

/// Record the total; a total set concurrently by someone else wins.
fn record_total(pagination: &Pagination, total: u64) {
    if let Err(err) = pagination.set_total_elements(total) {
        tracing::debug!(target: "pgorm_paginator", error = %err, "keeping previously recorded total");
    }
}
