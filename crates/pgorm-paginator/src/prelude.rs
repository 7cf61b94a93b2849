//! Convenient imports for typical `pgorm-paginator` usage.
//!
//! ```ignore
//! use pgorm_paginator::prelude::*;
//! ```

pub use crate::{
    Direction, FromRow, GenericClient, Order, Page, PageError, PageResult, Pagination, Paginator,
    PaginatorConfig, RowExt, SelectStatement, Sort, StatementModifier, select,
};

#[cfg(feature = "pool")]
pub use crate::create_pool;
