//! Row mapping for page items.

use crate::error::{PageError, PageResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Maps a database row into a page item.
///
/// ```ignore
/// struct Product { id: i64, code: String }
///
/// impl FromRow for Product {
///     fn from_row(row: &Row) -> PageResult<Self> {
///         Ok(Self { id: row.try_get_column("id")?, code: row.try_get_column("code")? })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> PageResult<Self>;
}

/// Extension trait for `Row` that maps decode failures to [`PageError::Decode`].
pub trait RowExt {
    fn try_get_column<'a, T: FromSql<'a>>(&'a self, column: &str) -> PageResult<T>;
}

impl RowExt for Row {
    fn try_get_column<'a, T: FromSql<'a>>(&'a self, column: &str) -> PageResult<T> {
        self.try_get(column)
            .map_err(|e| PageError::decode(column, e.to_string()))
    }
}

/// Read the single `COUNT(*)` value of a counting query.
pub(crate) fn count_from_row(row: &Row) -> PageResult<u64> {
    let count: i64 = row
        .try_get(0)
        .map_err(|e| PageError::decode("count", e.to_string()))?;
    u64::try_from(count).map_err(|_| PageError::decode("count", format!("negative count {count}")))
}
