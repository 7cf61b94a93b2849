use serde::Deserialize;
use std::time::Duration;

/// Configuration for the [`Paginator`](crate::Paginator).
///
/// Defaults: totals are counted, page sizes are unbounded, no timeout,
/// tags are prefixed with `paginator`.
///
/// Deserializes from application config; the timeout is given in
/// milliseconds (`query_timeout_ms`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginatorConfig {
    /// Run the counting sub-query when the pagination has no total yet.
    pub count_total: bool,
    /// Reject requests whose size exceeds this value.
    pub max_page_size: Option<u64>,
    /// Per-statement timeout.
    #[serde(rename = "query_timeout_ms", with = "millis")]
    pub query_timeout: Option<Duration>,
    /// Prefix for the `<prefix>.count` / `<prefix>.page` tags when the
    /// statement has no tag of its own.
    pub tag_prefix: String,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            count_total: true,
            max_page_size: None,
            query_timeout: None,
            tag_prefix: "paginator".to_string(),
        }
    }
}

impl PaginatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the counting sub-query; totals stay unset unless the caller sets them.
    pub fn without_count(mut self) -> Self {
        self.count_total = false;
        self
    }

    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Statements exceeding this duration fail with `PageError::Timeout`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
