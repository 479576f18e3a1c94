//! Catalog reads and admin writes.

use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, QueryBuilder, Sqlite};
use storefront_db::{current_timestamp, Db};
use tracing::{debug, info};

use crate::catalog::query::EFFECTIVE_PRICE_SQL;
use crate::catalog::{
    slugify, Brand, Category, Material, NewCategory, NewProduct, NewReview, NewTerm, Page,
    PageRequest, Pagination, Product, ProductDetail, ProductFilter, Review,
};
use crate::error::CommerceError;
use crate::ids::{BrandId, CategoryId, ProductId, UserId};

/// Size of the featured, new and best seller shelves.
const SHELF_LIMIT: i64 = 12;
const RELATED_LIMIT: i64 = 6;

const REVIEW_SELECT: &str = "SELECT r.id, r.product_id, r.user_id, u.username, r.rating, r.title, \
     r.comment, r.is_approved, r.is_verified_purchase, r.created_at \
     FROM reviews r JOIN users u ON u.id = r.user_id";

/// Catalog service over the storefront database.
#[derive(Debug, Clone)]
pub struct Catalog {
    db: Db,
}

impl Catalog {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Active categories, by name.
    pub async fn categories(&self) -> Result<Vec<Category>, CommerceError> {
        let categories = query_as("SELECT * FROM categories WHERE is_active = 1 ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;
        Ok(categories)
    }

    /// Active category by slug.
    pub async fn category(&self, slug: &str) -> Result<Category, CommerceError> {
        query_as("SELECT * FROM categories WHERE slug = ?1 AND is_active = 1")
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| CommerceError::CategoryNotFound(slug.to_string()))
    }

    /// Active children of a category.
    pub async fn subcategories(&self, slug: &str) -> Result<Vec<Category>, CommerceError> {
        let parent = self.category(slug).await?;
        let children = query_as(
            "SELECT * FROM categories WHERE parent_id = ?1 AND is_active = 1 ORDER BY name",
        )
        .bind(parent.id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(children)
    }

    /// Active products of a category.
    pub async fn category_products(
        &self,
        slug: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, CommerceError> {
        let category = self.category(slug).await?;
        let filter = ProductFilter {
            category: Some(category.slug),
            ..ProductFilter::default()
        };
        self.products(&filter, page).await
    }

    /// Active brands, optionally matching `search` in name or description.
    pub async fn brands(&self, search: Option<&str>) -> Result<Vec<Brand>, CommerceError> {
        let brands = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                query_as(
                    "SELECT * FROM brands WHERE is_active = 1
                     AND (name LIKE ?1 OR description LIKE ?1) ORDER BY name",
                )
                .bind(format!("%{term}%"))
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                query_as("SELECT * FROM brands WHERE is_active = 1 ORDER BY name")
                    .fetch_all(self.db.pool())
                    .await?
            }
        };
        Ok(brands)
    }

    /// Materials, optionally matching `search` in name.
    pub async fn materials(&self, search: Option<&str>) -> Result<Vec<Material>, CommerceError> {
        let pattern = format!("%{}%", search.map(str::trim).unwrap_or_default());
        let materials = query_as("SELECT * FROM materials WHERE name LIKE ?1 ORDER BY name")
            .bind(pattern)
            .fetch_all(self.db.pool())
            .await?;
        Ok(materials)
    }

    /// Filtered, ordered, paginated list of active products.
    pub async fn products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, CommerceError> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        push_product_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.db.pool()).await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT p.*");
        push_product_filters(&mut select, filter);
        select.push(" ORDER BY ").push(filter.ordering.to_sql());
        select
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = select
            .build_query_as::<Product>()
            .fetch_all(self.db.pool())
            .await?;

        debug!(total, returned = items.len(), "product list");
        Ok(Page {
            items,
            pagination: Pagination::new(page, total),
        })
    }

    /// Up to twelve featured products.
    pub async fn featured(&self) -> Result<Vec<Product>, CommerceError> {
        self.shelf("p.is_featured = 1", "p.created_at DESC, p.id DESC").await
    }

    /// Up to twelve products flagged new, newest first.
    pub async fn new_arrivals(&self) -> Result<Vec<Product>, CommerceError> {
        self.shelf("p.is_new = 1", "p.created_at DESC, p.id DESC").await
    }

    /// Up to twelve most viewed products.
    pub async fn best_sellers(&self) -> Result<Vec<Product>, CommerceError> {
        self.shelf("1 = 1", "p.views DESC, p.id DESC").await
    }

    async fn shelf(&self, condition: &str, order: &str) -> Result<Vec<Product>, CommerceError> {
        let products = query_as(&format!(
            "SELECT p.* FROM products p WHERE p.is_active = 1 AND {condition} ORDER BY {order} LIMIT ?1"
        ))
        .bind(SHELF_LIMIT)
        .fetch_all(self.db.pool())
        .await?;
        Ok(products)
    }

    /// Up to six other active products from the same category.
    pub async fn related(&self, slug: &str) -> Result<Vec<Product>, CommerceError> {
        let product = self.product_by_slug(slug).await?;
        let Some(category) = product.category_id else {
            return Ok(Vec::new());
        };

        let related = query_as(
            "SELECT p.* FROM products p
             WHERE p.is_active = 1 AND p.category_id = ?1 AND p.id != ?2
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?3",
        )
        .bind(category)
        .bind(product.id)
        .bind(RELATED_LIMIT)
        .fetch_all(self.db.pool())
        .await?;
        Ok(related)
    }

    /// Active product by slug, without side effects.
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, CommerceError> {
        query_as("SELECT p.* FROM products p WHERE p.slug = ?1 AND p.is_active = 1")
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(slug.to_string()))
    }

    /// Product detail page. Counts as a view.
    pub async fn product(&self, slug: &str) -> Result<ProductDetail, CommerceError> {
        self.increment_view(slug).await?;
        let product = self.product_by_slug(slug).await?;
        let pool = self.db.pool();

        let category: Option<Category> = match product.category_id {
            Some(id) => query_as("SELECT * FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(pool)
                .await?,
            None => None,
        };
        let brand: Option<Brand> = match product.brand_id {
            Some(id) => query_as("SELECT * FROM brands WHERE id = ?1")
                .bind(id)
                .fetch_optional(pool)
                .await?,
            None => None,
        };
        let materials: Vec<Material> = query_as(
            "SELECT m.* FROM materials m
             JOIN product_materials pm ON pm.material_id = m.id
             WHERE pm.product_id = ?1 ORDER BY m.name",
        )
        .bind(product.id)
        .fetch_all(pool)
        .await?;

        let (review_count, rating_sum): (i64, Option<i64>) = query_as(
            "SELECT COUNT(*), SUM(rating) FROM reviews WHERE product_id = ?1 AND is_approved = 1",
        )
        .bind(product.id)
        .fetch_one(pool)
        .await?;

        let average_rating = match (review_count, rating_sum) {
            (count, Some(sum)) if count > 0 => {
                Some((Decimal::from(sum) / Decimal::from(count)).round_dp(1))
            }
            _ => None,
        };

        Ok(ProductDetail {
            product,
            category,
            brand,
            materials,
            average_rating,
            review_count,
        })
    }

    /// Bump the view counter, returning the new count.
    pub async fn increment_view(&self, slug: &str) -> Result<i64, CommerceError> {
        query_scalar(
            "UPDATE products SET views = views + 1 WHERE slug = ?1 AND is_active = 1 RETURNING views",
        )
        .bind(slug)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| CommerceError::ProductNotFound(slug.to_string()))
    }

    /// Approved reviews of a product, newest first.
    pub async fn reviews(&self, slug: &str) -> Result<Vec<Review>, CommerceError> {
        let product = self.product_by_slug(slug).await?;
        let reviews = query_as(&format!(
            "{REVIEW_SELECT} WHERE r.product_id = ?1 AND r.is_approved = 1
             ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(product.id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(reviews)
    }

    /// Reviews written by `user`, newest first.
    pub async fn my_reviews(&self, user: UserId) -> Result<Vec<Review>, CommerceError> {
        let reviews = query_as(&format!(
            "{REVIEW_SELECT} WHERE r.user_id = ?1 ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(user)
        .fetch_all(self.db.pool())
        .await?;
        Ok(reviews)
    }

    /// Write a review. One review per user and product.
    ///
    /// The review is marked as a verified purchase when the user has an order
    /// for the product that was not cancelled.
    pub async fn create_review(
        &self,
        user: UserId,
        review: NewReview,
    ) -> Result<Review, CommerceError> {
        review.validate()?;
        let pool = self.db.pool();

        let active: Option<i64> =
            query_scalar("SELECT id FROM products WHERE id = ?1 AND is_active = 1")
                .bind(review.product_id)
                .fetch_optional(pool)
                .await?;
        if active.is_none() {
            return Err(CommerceError::ProductNotFound(review.product_id.to_string()));
        }

        let verified: bool = query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM order_items oi JOIN orders o ON o.id = oi.order_id
                 WHERE o.user_id = ?1 AND oi.product_id = ?2 AND o.status != 'cancelled'
             )",
        )
        .bind(user)
        .bind(review.product_id)
        .fetch_one(pool)
        .await?;

        let id: i64 = query_scalar(
            "INSERT INTO reviews (product_id, user_id, rating, title, comment, is_approved, is_verified_purchase, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7) RETURNING id",
        )
        .bind(review.product_id)
        .bind(user)
        .bind(review.rating)
        .bind(review.title.trim())
        .bind(review.comment.trim())
        .bind(verified)
        .bind(current_timestamp())
        .fetch_one(pool)
        .await?;

        let created = query_as(&format!("{REVIEW_SELECT} WHERE r.id = ?1"))
            .bind(id)
            .fetch_one(pool)
            .await?;

        info!(user = %user, product = %review.product_id, verified, "review created");
        Ok(created)
    }

    /// Create a category; the slug derives from the name.
    pub async fn create_category(&self, category: NewCategory) -> Result<Category, CommerceError> {
        let slug = required_slug(&category.name)?;
        let created = query_as(
            "INSERT INTO categories (parent_id, name, slug, description, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5) RETURNING *",
        )
        .bind(category.parent_id)
        .bind(category.name.trim())
        .bind(slug)
        .bind(&category.description)
        .bind(current_timestamp())
        .fetch_one(self.db.pool())
        .await?;
        Ok(created)
    }

    /// Create a brand; the slug derives from the name.
    pub async fn create_brand(&self, brand: NewTerm) -> Result<Brand, CommerceError> {
        let slug = required_slug(&brand.name)?;
        let created = query_as(
            "INSERT INTO brands (name, slug, description, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4) RETURNING *",
        )
        .bind(brand.name.trim())
        .bind(slug)
        .bind(&brand.description)
        .bind(current_timestamp())
        .fetch_one(self.db.pool())
        .await?;
        Ok(created)
    }

    /// Create a material; the slug derives from the name.
    pub async fn create_material(&self, material: NewTerm) -> Result<Material, CommerceError> {
        let slug = required_slug(&material.name)?;
        let created = query_as(
            "INSERT INTO materials (name, slug, description) VALUES (?1, ?2, ?3) RETURNING *",
        )
        .bind(material.name.trim())
        .bind(slug)
        .bind(&material.description)
        .fetch_one(self.db.pool())
        .await?;
        Ok(created)
    }

    /// Create a product and link its materials.
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CommerceError> {
        if product.sku.trim().is_empty() {
            return Err(CommerceError::ValidationError("sku is required".to_string()));
        }
        if product.stock < 0 || product.price.is_negative() {
            return Err(CommerceError::ValidationError(
                "price and stock must not be negative".to_string(),
            ));
        }
        if let Some(sale) = product.sale_price {
            if sale.currency != product.price.currency || sale.is_negative() {
                return Err(CommerceError::ValidationError(
                    "sale price must be a non-negative amount in the list currency".to_string(),
                ));
            }
        }
        let slug = match product.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => required_slug(&product.name)?,
        };
        let now = current_timestamp();

        let mut tx = self.db.begin().await?;

        let created: Product = query_as(
            "INSERT INTO products (name, slug, sku, description, category_id, brand_id, currency,
                                   price_cents, sale_price_cents, stock, is_active, is_featured,
                                   is_new, views, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?12, 0, ?13, ?13)
             RETURNING *",
        )
        .bind(product.name.trim())
        .bind(&slug)
        .bind(product.sku.trim())
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.brand_id)
        .bind(product.price.currency.code())
        .bind(product.price.amount_cents)
        .bind(product.sale_price.map(|m| m.amount_cents))
        .bind(product.stock)
        .bind(product.is_featured)
        .bind(product.is_new)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for material in &product.material_ids {
            query("INSERT INTO product_materials (product_id, material_id) VALUES (?1, ?2)")
                .bind(created.id)
                .bind(material)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(sku = %created.sku, slug = %created.slug, stock = created.stock, "product created");
        Ok(created)
    }

    /// Category by slug regardless of active flag.
    pub async fn find_category(&self, slug: &str) -> Result<Option<CategoryId>, CommerceError> {
        Ok(query_scalar("SELECT id FROM categories WHERE slug = ?1")
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?)
    }

    /// Brand by slug regardless of active flag.
    pub async fn find_brand(&self, slug: &str) -> Result<Option<BrandId>, CommerceError> {
        Ok(query_scalar("SELECT id FROM brands WHERE slug = ?1")
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?)
    }

    /// Material by name, case-insensitive.
    pub async fn find_material(&self, name: &str) -> Result<Option<Material>, CommerceError> {
        Ok(query_as("SELECT * FROM materials WHERE lower(name) = lower(?1)")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?)
    }

    /// Product id by slug regardless of active flag.
    pub async fn find_product(&self, slug: &str) -> Result<Option<ProductId>, CommerceError> {
        Ok(query_scalar("SELECT id FROM products WHERE slug = ?1")
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await?)
    }
}

fn required_slug(name: &str) -> Result<String, CommerceError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(CommerceError::ValidationError("name is required".to_string()));
    }
    Ok(slug)
}

fn push_product_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    qb.push(
        " FROM products p
          LEFT JOIN categories c ON c.id = p.category_id
          LEFT JOIN brands b ON b.id = p.brand_id
          WHERE p.is_active = 1",
    );

    if let Some(category) = &filter.category {
        qb.push(" AND c.slug = ").push_bind(category.clone());
    }
    if let Some(brand) = &filter.brand {
        qb.push(" AND b.slug = ").push_bind(brand.clone());
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{term}%");
        qb.push(" AND (p.name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description LIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.sku LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(min) = filter.min_price {
        qb.push(format!(" AND {EFFECTIVE_PRICE_SQL} >= "))
            .push_bind(min.amount_cents);
    }
    if let Some(max) = filter.max_price {
        qb.push(format!(" AND {EFFECTIVE_PRICE_SQL} <= "))
            .push_bind(max.amount_cents);
    }
    if filter.in_stock {
        qb.push(" AND p.stock > 0");
    }
}
