//! The pagination value object.
//!
//! A [`Pagination`] is built once by the caller before a query is issued. Its
//! page/size/sort are immutable; the total element count is filled in later,
//! exactly once, by whoever runs the counting query (normally the
//! [`Paginator`](crate::Paginator)).
//!
//! Pages are zero-based: page `0` is the first page.

use crate::error::{PageError, PageResult};
use crate::page::PageMetadata;
use crate::sort::Sort;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Offset/limit pagination request with an optional sort and a set-once
/// total element count.
pub struct Pagination {
    page: u64,
    size: u64,
    sort: Sort,
    total_elements: RwLock<Option<u64>>,
}

impl Pagination {
    /// Create a pagination for `page` (zero-based) with `size` rows per page.
    ///
    /// A positive page with a zero size is rejected. `(0, 0)` is the unpaged
    /// request. `size` and `page * size` must fit a Postgres `bigint`.
    pub fn new(page: u64, size: u64, sort: Sort) -> PageResult<Self> {
        if page > 0 && size == 0 {
            return Err(PageError::SizeNotAllowed { page });
        }
        let max = i64::MAX as u64;
        match page.checked_mul(size) {
            Some(offset) if offset <= max && size <= max => {}
            _ => return Err(PageError::PageOutOfRange { page, size }),
        }
        Ok(Self {
            page,
            size,
            sort,
            total_elements: RwLock::new(None),
        })
    }

    /// Unsorted shorthand for [`Pagination::new`].
    pub fn of(page: u64, size: u64) -> PageResult<Self> {
        Self::new(page, size, Sort::unsorted())
    }

    /// Create a pagination from signed input (query strings, RPC payloads).
    pub fn from_signed(page: i64, size: i64, sort: Sort) -> PageResult<Self> {
        let page = u64::try_from(page).map_err(|_| PageError::PageCantBeNegative(page))?;
        let size = u64::try_from(size).map_err(|_| PageError::SizeCantBeNegative(size))?;
        Self::new(page, size, sort)
    }

    /// A request that applies no LIMIT/OFFSET; the whole result set is one page.
    pub fn unpaged() -> Self {
        Self {
            page: 0,
            size: 0,
            sort: Sort::unsorted(),
            total_elements: RwLock::new(None),
        }
    }

    /// Replace the sort.
    pub fn with_sort(mut self, sort: impl Into<Sort>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Rows to skip: `page * size`, at most `i64::MAX`.
    pub fn offset(&self) -> u64 {
        self.page * self.size
    }

    /// Rows to fetch, or `None` when unpaged.
    pub fn limit(&self) -> Option<u64> {
        (!self.is_unpaged()).then_some(self.size)
    }

    /// `ceil(total_elements / size)`, or `1` when the size is zero.
    pub fn total_pages(&self) -> u64 {
        if self.size > 0 {
            calculate_total_pages(self.total_elements(), self.size)
        } else {
            1
        }
    }

    /// The recorded total, or `0` if it has not been set yet.
    pub fn total_elements(&self) -> u64 {
        self.read_total().unwrap_or(0)
    }

    pub fn is_total_elements_set(&self) -> bool {
        self.read_total().is_some()
    }

    /// Record the total element count.
    ///
    /// Only the first call succeeds; later calls return
    /// [`PageError::TotalElementsAlreadySet`] and leave the stored value alone.
    pub fn set_total_elements(&self, total_elements: u64) -> PageResult<()> {
        let mut guard = self
            .total_elements
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match *guard {
            Some(current) => Err(PageError::TotalElementsAlreadySet {
                current,
                rejected: total_elements,
            }),
            None => {
                *guard = Some(total_elements);
                Ok(())
            }
        }
    }

    /// `page == 0 && size == 0`
    pub fn is_unpaged(&self) -> bool {
        self.page == 0 && self.size == 0
    }

    pub fn is_sorted(&self) -> bool {
        !self.sort.is_empty()
    }

    /// Whether a page after this one exists. Needs the total to be set.
    pub fn has_next(&self) -> bool {
        !self.is_unpaged() && self.page.saturating_add(1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Snapshot of the page numbers for responses.
    pub fn metadata(&self) -> PageMetadata {
        PageMetadata {
            page: self.page,
            size: self.size,
            total_elements: self.total_elements(),
            total_pages: self.total_pages(),
            unpaged: self.is_unpaged(),
        }
    }

    fn read_total(&self) -> Option<u64> {
        *self
            .total_elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::unpaged()
    }
}

impl Clone for Pagination {
    fn clone(&self) -> Self {
        Self {
            page: self.page,
            size: self.size,
            sort: self.sort.clone(),
            total_elements: RwLock::new(self.read_total()),
        }
    }
}

impl fmt::Debug for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pagination")
            .field("page", &self.page)
            .field("size", &self.size)
            .field("sort", &self.sort)
            .field("total_elements", &self.read_total())
            .finish()
    }
}

pub(crate) fn calculate_total_pages(total_elements: u64, size: u64) -> u64 {
    total_elements.div_ceil(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Order;
    use std::sync::Arc;

    #[test]
    fn test_unpaged() {
        assert!(Pagination::of(0, 0).unwrap().is_unpaged());
        assert!(Pagination::unpaged().is_unpaged());
        assert!(!Pagination::of(0, 1).unwrap().is_unpaged());
        assert!(!Pagination::of(3, 1).unwrap().is_unpaged());
    }

    #[test]
    fn test_positive_page_without_size() {
        assert!(matches!(
            Pagination::of(1, 0),
            Err(PageError::SizeNotAllowed { page: 1 })
        ));
    }

    #[test]
    fn test_negative_input() {
        assert!(matches!(
            Pagination::from_signed(-1, 10, Sort::unsorted()),
            Err(PageError::PageCantBeNegative(-1))
        ));
        assert!(matches!(
            Pagination::from_signed(0, -5, Sort::unsorted()),
            Err(PageError::SizeCantBeNegative(-5))
        ));
        assert!(matches!(
            Pagination::from_signed(2, 0, Sort::unsorted()),
            Err(PageError::SizeNotAllowed { page: 2 })
        ));
        let p = Pagination::from_signed(2, 5, Sort::unsorted()).unwrap();
        assert_eq!((p.page(), p.size()), (2, 5));
    }

    #[test]
    fn test_offset_and_limit() {
        let p = Pagination::of(2, 5).unwrap();
        assert_eq!(p.offset(), 10);
        assert_eq!(p.limit(), Some(5));
        assert_eq!(Pagination::of(0, 5).unwrap().offset(), 0);
        assert_eq!(Pagination::unpaged().limit(), None);
    }

    #[test]
    fn test_offset_must_fit_bigint() {
        assert!(matches!(
            Pagination::from_signed(i64::MAX, 2, Sort::unsorted()),
            Err(PageError::PageOutOfRange { size: 2, .. })
        ));
        assert!(matches!(
            Pagination::of(u64::MAX, 2),
            Err(PageError::PageOutOfRange { .. })
        ));
        assert!(matches!(
            Pagination::of(0, u64::MAX),
            Err(PageError::PageOutOfRange { page: 0, .. })
        ));
        let last = Pagination::of(i64::MAX as u64, 1).unwrap();
        assert_eq!(last.offset(), i64::MAX as u64);
        assert_eq!(Pagination::of(0, i64::MAX as u64).unwrap().limit(), Some(i64::MAX as u64));
    }

    #[test]
    fn test_calculate_total_pages() {
        assert_eq!(calculate_total_pages(2, 4), 1);
        assert_eq!(calculate_total_pages(3, 2), 2);
        assert_eq!(calculate_total_pages(4, 2), 2);
        assert_eq!(calculate_total_pages(0, 2), 0);
    }

    #[test]
    fn test_total_pages_without_size() {
        let p = Pagination::unpaged();
        p.set_total_elements(42).unwrap();
        assert_eq!(p.total_pages(), 1);
        assert!(!p.has_next());
    }

    #[test]
    fn test_total_elements_before_set() {
        let p = Pagination::of(0, 10).unwrap();
        assert!(!p.is_total_elements_set());
        assert_eq!(p.total_elements(), 0);
        assert_eq!(p.total_pages(), 0);
    }

    #[test]
    fn test_set_total_elements_once() {
        let p = Pagination::of(0, 2).unwrap();
        p.set_total_elements(3).unwrap();
        assert!(p.is_total_elements_set());
        assert_eq!(p.total_elements(), 3);
        assert_eq!(p.total_pages(), 2);

        match p.set_total_elements(9) {
            Err(PageError::TotalElementsAlreadySet { current, rejected }) => {
                assert_eq!((current, rejected), (3, 9));
            }
            other => panic!("expected TotalElementsAlreadySet, got {other:?}"),
        }
        assert_eq!(p.total_elements(), 3);
    }

    #[test]
    fn test_concurrent_setters() {
        let p = Arc::new(Pagination::of(0, 10).unwrap());
        let handles: Vec<_> = (1..=16u64)
            .map(|n| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || p.set_total_elements(n).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!((1..=16).contains(&p.total_elements()));
    }

    #[test]
    fn test_has_next_previous() {
        let first = Pagination::of(0, 2).unwrap();
        first.set_total_elements(5).unwrap();
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = Pagination::of(2, 2).unwrap();
        last.set_total_elements(5).unwrap();
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_sorted() {
        let p = Pagination::of(0, 5).unwrap();
        assert!(!p.is_sorted());
        let p = p.with_sort(Order::desc("price").unwrap());
        assert!(p.is_sorted());
        assert_eq!(p.sort().to_string(), "price desc");
    }

    #[test]
    fn test_clone_keeps_total() {
        let p = Pagination::of(1, 3).unwrap();
        p.set_total_elements(7).unwrap();
        let c = p.clone();
        assert_eq!(c.total_elements(), 7);
        assert!(c.set_total_elements(8).is_err());
    }
}
