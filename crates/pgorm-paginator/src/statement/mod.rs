//! The host SELECT statement that pagination plugs into.
//!
//! ```ignore
//! use pgorm_paginator::select;
//!
//! let stmt = select("products p")
//!     .left_join("prices pr", "pr.product_id = p.id")
//!     .gt("p.price", 10i64)
//!     .order_by("p.id");
//!
//! assert_eq!(
//!     stmt.to_count_sql(),
//!     "SELECT COUNT(*) FROM products p LEFT JOIN prices pr ON pr.product_id = p.id WHERE p.price > $1"
//! );
//! ```

mod filter;
mod param;
mod select;


pub use filter::Filter;
pub use param::{Param, ParamList};
pub use select::SelectStatement;

/// Start a `SELECT * FROM <from_expr>` statement.
pub fn select(from_expr: &str) -> SelectStatement {
    SelectStatement::new(from_expr)
}
