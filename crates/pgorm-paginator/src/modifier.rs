//! Statement modifiers: objects that rewrite a [`SelectStatement`] before it runs.

use crate::pagination::Pagination;
use crate::sort::Sort;
use crate::statement::SelectStatement;

/// Rewrites a statement in place.
///
/// The paginator applies the [`Pagination`] modifier to a clone of the
/// caller's statement, so the original stays usable for counting.
pub trait StatementModifier {
    fn modify_statement(&self, stmt: &mut SelectStatement);
}

impl StatementModifier for Sort {
    fn modify_statement(&self, stmt: &mut SelectStatement) {
        if !self.is_empty() {
            stmt.push_order_by(&self.to_string());
        }
    }
}

/// Adds `LIMIT size OFFSET page*size` unless unpaged, then appends the sort.
impl StatementModifier for Pagination {
    fn modify_statement(&self, stmt: &mut SelectStatement) {
        if let Some(limit) = self.limit() {
            stmt.set_limit(limit).set_offset(self.offset());
        }
        self.sort().modify_statement(stmt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Order;
    use crate::statement::select;

    #[test]
    fn test_unpaged_leaves_statement_alone() {
        let stmt = select("products").apply(&Pagination::unpaged());
        assert_eq!(stmt.to_sql(), "SELECT * FROM products");
    }

    #[test]
    fn test_paged() {
        let stmt = select("products").apply(&Pagination::of(2, 5).unwrap());
        assert_eq!(stmt.to_sql(), "SELECT * FROM products LIMIT 5 OFFSET 10");
    }

    #[test]
    fn test_first_page_has_zero_offset() {
        let stmt = select("products").apply(&Pagination::of(0, 1).unwrap());
        assert_eq!(stmt.to_sql(), "SELECT * FROM products LIMIT 1 OFFSET 0");
    }

    #[test]
    fn test_sort_is_appended() {
        let pagination = Pagination::of(1, 10)
            .unwrap()
            .with_sort(Sort::new([Order::asc("code").unwrap(), Order::desc("price").unwrap()]));
        let stmt = select("products")
            .eq("active", true)
            .order_by("category")
            .apply(&pagination);
        assert_eq!(
            stmt.to_sql(),
            "SELECT * FROM products WHERE active = $1 ORDER BY category, code asc, price desc LIMIT 10 OFFSET 10"
        );
    }

    #[test]
    fn test_sorted_unpaged() {
        let pagination = Pagination::unpaged().with_sort(Order::desc("id").unwrap());
        let stmt = select("products").apply(&pagination);
        assert_eq!(stmt.to_sql(), "SELECT * FROM products ORDER BY id desc");
    }
}
