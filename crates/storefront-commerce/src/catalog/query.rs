//! Product listing filters, ordering and pagination.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::money::Money;

/// SQL expression for the price a customer pays, over alias `p`.
pub(crate) const EFFECTIVE_PRICE_SQL: &str = "(CASE WHEN p.sale_price_cents IS NOT NULL \
     AND p.sale_price_cents < p.price_cents THEN p.sale_price_cents ELSE p.price_cents END)";

/// Product list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductOrdering {
    /// Newest first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Name A-Z.
    NameAsc,
    /// Name Z-A.
    NameDesc,
    /// Most viewed first.
    MostViewed,
}

impl ProductOrdering {
    /// Get SQL ORDER BY clause.
    pub fn to_sql(&self) -> String {
        match self {
            ProductOrdering::Newest => "p.created_at DESC, p.id DESC".to_string(),
            ProductOrdering::Oldest => "p.created_at ASC, p.id ASC".to_string(),
            ProductOrdering::PriceAsc => format!("{EFFECTIVE_PRICE_SQL} ASC, p.id ASC"),
            ProductOrdering::PriceDesc => format!("{EFFECTIVE_PRICE_SQL} DESC, p.id DESC"),
            ProductOrdering::NameAsc => "p.name ASC".to_string(),
            ProductOrdering::NameDesc => "p.name DESC".to_string(),
            ProductOrdering::MostViewed => "p.views DESC, p.id DESC".to_string(),
        }
    }

    /// Query parameter spelling, e.g. `-price`.
    pub fn as_param(&self) -> &'static str {
        match self {
            ProductOrdering::Newest => "-created_at",
            ProductOrdering::Oldest => "created_at",
            ProductOrdering::PriceAsc => "price",
            ProductOrdering::PriceDesc => "-price",
            ProductOrdering::NameAsc => "name",
            ProductOrdering::NameDesc => "-name",
            ProductOrdering::MostViewed => "-views",
        }
    }
}

impl FromStr for ProductOrdering {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "-created_at" => Ok(ProductOrdering::Newest),
            "created_at" => Ok(ProductOrdering::Oldest),
            "price" => Ok(ProductOrdering::PriceAsc),
            "-price" => Ok(ProductOrdering::PriceDesc),
            "name" => Ok(ProductOrdering::NameAsc),
            "-name" => Ok(ProductOrdering::NameDesc),
            "-views" | "views" => Ok(ProductOrdering::MostViewed),
            other => Err(CommerceError::ValidationError(format!(
                "unknown ordering: {other}"
            ))),
        }
    }
}

/// Filters for the product list. Only active products are ever listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Brand slug.
    pub brand: Option<String>,
    /// Matches name, description or SKU.
    pub search: Option<String>,
    /// Lower bound on effective price, inclusive.
    pub min_price: Option<Money>,
    /// Upper bound on effective price, inclusive.
    pub max_price: Option<Money>,
    /// Only products with stock.
    pub in_stock: bool,
    pub ordering: ProductOrdering,
}

/// Requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-indexed page.
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: i64 = 24;
    pub const MAX_PER_PAGE: i64 = 100;

    /// Clamp caller input into a valid window.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Get the offset for SQL queries.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
    /// Total number of items.
    pub total: i64,
    /// Total number of pages.
    pub total_pages: i64,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info.
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            (total + request.per_page - 1) / request.per_page
        };

        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_params() {
        assert_eq!("-price".parse::<ProductOrdering>().unwrap(), ProductOrdering::PriceDesc);
        assert_eq!("".parse::<ProductOrdering>().unwrap(), ProductOrdering::Newest);
        assert!("random".parse::<ProductOrdering>().is_err());

        for ordering in [
            ProductOrdering::Newest,
            ProductOrdering::Oldest,
            ProductOrdering::PriceAsc,
            ProductOrdering::PriceDesc,
            ProductOrdering::NameAsc,
            ProductOrdering::NameDesc,
            ProductOrdering::MostViewed,
        ] {
            assert_eq!(ordering.as_param().parse::<ProductOrdering>().unwrap(), ordering);
        }
    }

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(1_000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, PageRequest::MAX_PER_PAGE);

        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_pagination() {
        let p = Pagination::new(PageRequest::new(Some(2), Some(10)), 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);

        let empty = Pagination::new(PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
    }
}
