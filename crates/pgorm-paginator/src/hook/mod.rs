//! Hooks into the statements the paginator executes.
//!
//! The paginator runs two statements per page: the counting sub-query and the
//! page query. A [`QueryHook`] sees both before they run and may rewrite or
//! refuse them, and is told how they went afterwards.
//!
//! ```rust,ignore
//! use pgorm_paginator::{HookAction, Paginator, QueryContext, QueryHook, QueryKind};
//!
//! // Skip counting on the hot path by refusing count statements.
//! struct NoCount;
//!
//! impl QueryHook for NoCount {
//!     fn before_query(&self, ctx: &QueryContext) -> HookAction {
//!         match ctx.kind {
//!             QueryKind::Count => HookAction::Abort("counting disabled".into()),
//!             QueryKind::Page => HookAction::Continue,
//!         }
//!     }
//! }
//!
//! let paginator = Paginator::new().with_hook(NoCount);
//! ```

mod composite;
mod tracing_hook;
mod types;

#[cfg(test)]
mod tests;

pub use composite::CompositeHook;
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryKind, QueryOutcome};
