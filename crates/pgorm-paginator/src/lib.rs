//! # pgorm-paginator
//!
//! Offset/limit pagination for PostgreSQL queries built on `tokio-postgres`.
//!
//! ## Features
//!
//! - **Validated requests**: a [`Pagination`] is a `(page, size)` pair plus a
//!   [`Sort`]; page numbers are zero-based and `(0, 0)` means unpaged
//! - **Total counts**: the paginator runs a counting sub-query and records the
//!   total once; later writes are rejected
//! - **Sort rendering**: orders render as `created_at desc, id` and are appended
//!   after the statement's own ORDER BY
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Hooks**: inspect, rewrite or refuse the count and page statements
//!
//! ## Example
//!
//! ```ignore
//! use pgorm_paginator::prelude::*;
//!
//! let pagination = Pagination::of(0, 20)?.with_sort(Sort::parse("price desc, id")?);
//! let stmt = select("products").gte("price", 100i64).tag("products");
//!
//! let page: Page<Product> = Paginator::new()
//!     .fetch_page(&client, &stmt, &pagination)
//!     .await?;
//!
//! assert_eq!(page.metadata().total_pages, pagination.total_pages());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hook;
pub mod modifier;
pub mod page;
pub mod pagination;
pub mod paginator;
pub mod prelude;
pub mod row;
pub mod sort;
pub mod statement;

pub use client::GenericClient;
pub use config::PaginatorConfig;
pub use error::{PageError, PageResult};
pub use hook::{
    CompositeHook, HookAction, QueryContext, QueryHook, QueryKind, QueryOutcome, TracingSqlHook,
};
pub use modifier::StatementModifier;
pub use page::{Page, PageMetadata};
pub use pagination::Pagination;
pub use paginator::Paginator;
pub use row::{FromRow, RowExt};
pub use sort::{Direction, Order, Sort};
pub use statement::{Filter, Param, ParamList, SelectStatement, select};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
