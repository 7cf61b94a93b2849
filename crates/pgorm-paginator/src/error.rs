//! Error types for pgorm-paginator

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pagination operations
pub type PageResult<T> = Result<T, PageError>;

/// Errors raised while building or executing a paginated query.
#[derive(Debug, Error)]
pub enum PageError {
    /// A negative page number was supplied
    #[error("page number can't be negative: {0}")]
    PageCantBeNegative(i64),

    /// A negative page size was supplied
    #[error("size can't be negative: {0}")]
    SizeCantBeNegative(i64),

    /// A positive page was requested with a zero size
    #[error("size is not allowed: page {page} requires a size greater than zero")]
    SizeNotAllowed { page: u64 },

    /// `size` or `page * size` does not fit a Postgres `bigint`
    #[error("page {page} with size {size} is out of range")]
    PageOutOfRange { page: u64, size: u64 },

    /// The page size exceeds the configured maximum
    #[error("page size {size} exceeds the maximum of {max}")]
    PageSizeTooLarge { size: u64, max: u64 },

    /// An order was built without a property
    #[error("order property is empty")]
    OrderPropertyIsEmpty,

    /// An order property is not a plain or quoted column name
    #[error("order property is not valid: {property} ({reason})")]
    OrderPropertyNotValid { property: String, reason: String },

    /// An order direction was not one of `asc`, `desc` or empty
    #[error("order direction is not valid: {direction}")]
    OrderDirectionNotValid { direction: String },

    /// The total element count was already recorded
    #[error("total elements already set to {current}, rejected {rejected}")]
    TotalElementsAlreadySet { current: u64, rejected: u64 },

    /// Statement validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A query hook refused to run the statement
    #[error("Query aborted by hook: {0}")]
    Aborted(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl PageError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error comes from invalid pagination or ordering input,
    /// as opposed to a failure while talking to the database.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Self::PageCantBeNegative(_)
                | Self::SizeCantBeNegative(_)
                | Self::SizeNotAllowed { .. }
                | Self::PageOutOfRange { .. }
                | Self::PageSizeTooLarge { .. }
                | Self::OrderPropertyIsEmpty
                | Self::OrderPropertyNotValid { .. }
                | Self::OrderDirectionNotValid { .. }
        )
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Map a tokio_postgres error.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        Self::Query(err)
    }

    /// SQLSTATE of a database error (`42703` for an unknown sort column).
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Query(err) => err.as_db_error().map(|db_err| db_err.code().code()),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for PageError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
