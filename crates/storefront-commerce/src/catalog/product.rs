//! Product types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::catalog::{Brand, Category, Material};
use crate::ids::{BrandId, CategoryId, MaterialId, ProductId};
use crate::money::{Currency, Money};

/// A sellable catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Stock keeping unit.
    pub sku: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    /// List price.
    pub price: Money,
    /// Sale price, honoured only when below `price`.
    pub sale_price: Option<Money>,
    /// Units on hand. Never negative.
    pub stock: i64,
    /// Inactive products cannot be listed or ordered.
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    /// Detail page views.
    pub views: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Check if a sale price is in effect.
    pub fn is_on_sale(&self) -> bool {
        self.sale_price
            .map(|sale| sale.amount_cents < self.price.amount_cents)
            .unwrap_or(false)
    }

    /// Price a customer pays per unit.
    pub fn effective_price(&self) -> Money {
        match self.sale_price {
            Some(sale) if self.is_on_sale() => sale,
            _ => self.price,
        }
    }

    /// Whole-percent discount of the sale price, if on sale.
    pub fn discount_percentage(&self) -> Option<Decimal> {
        if !self.is_on_sale() || self.price.is_zero() {
            return None;
        }
        let off = self.price.to_decimal() - self.effective_price().to_decimal();
        Some((off / self.price.to_decimal() * Decimal::ONE_HUNDRED).round())
    }

    /// Check if product is in stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Check if `quantity` units can be sold right now.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.is_active && quantity <= self.stock
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    /// Derived from `name` when absent.
    pub slug: Option<String>,
    pub sku: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub stock: i64,
    pub is_featured: bool,
    pub is_new: bool,
    pub material_ids: Vec<MaterialId>,
}

/// Product with its taxonomy and review summary, for detail pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
    pub materials: Vec<Material>,
    /// Mean rating of approved reviews, one decimal place.
    pub average_rating: Option<Decimal>,
    pub review_count: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Product {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let code: String = row.try_get("currency")?;
        let currency = Currency::from_code(&code).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "currency".to_string(),
            source: format!("unknown currency {code}").into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            sku: row.try_get("sku")?,
            description: row.try_get("description")?,
            category_id: row.try_get("category_id")?,
            brand_id: row.try_get("brand_id")?,
            price: Money::new(row.try_get("price_cents")?, currency),
            sale_price: row
                .try_get::<Option<i64>, _>("sale_price_cents")?
                .map(|cents| Money::new(cents, currency)),
            stock: row.try_get("stock")?,
            is_active: row.try_get("is_active")?,
            is_featured: row.try_get("is_featured")?,
            is_new: row.try_get("is_new")?,
            views: row.try_get("views")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_product(id: i64, stock: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: "Sofa Classic Gray".to_string(),
        slug: "sofa-classic-gray".to_string(),
        sku: "SOFA-CLASSIC-GRAY".to_string(),
        description: String::new(),
        category_id: None,
        brand_id: None,
        price: Money::new(59_999, Currency::PEN),
        sale_price: None,
        stock,
        is_active: true,
        is_featured: false,
        is_new: false,
        views: 0,
        created_at: 0,
        updated_at: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price_without_sale() {
        let product = sample_product(1, 5);
        assert!(!product.is_on_sale());
        assert_eq!(product.effective_price(), product.price);
        assert_eq!(product.discount_percentage(), None);
    }

    #[test]
    fn test_sale_price_above_list_is_ignored() {
        let mut product = sample_product(1, 5);
        product.sale_price = Some(Money::new(70_000, Currency::PEN));
        assert!(!product.is_on_sale());
        assert_eq!(product.effective_price().amount_cents, 59_999);
    }

    #[test]
    fn test_discount_percentage() {
        let mut product = sample_product(1, 5);
        product.price = Money::new(10_000, Currency::PEN);
        product.sale_price = Some(Money::new(7_500, Currency::PEN));
        assert_eq!(product.discount_percentage(), Some(Decimal::from(25)));
    }

    #[test]
    fn test_can_fulfill() {
        let mut product = sample_product(1, 3);
        assert!(product.can_fulfill(3));
        assert!(!product.can_fulfill(4));
        product.is_active = false;
        assert!(!product.can_fulfill(1));
    }
}
