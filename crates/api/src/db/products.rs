//! Product repository for database operations.
//!
//! The catalog's derived columns (`rating`, `num_reviews`) are owned by this
//! module: the only write path that touches them is [`ProductRepository::add_review`],
//! which recomputes both inside the same transaction that inserts the review.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use orchard_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::product::mean_rating;
use crate::models::{Product, Review};

/// Page size for catalog search, fixed by the API contract.
pub const PAGE_SIZE: i64 = 10;

/// Database row for `shop.product`.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    image: String,
    brand: String,
    category: String,
    count_in_stock: i32,
    description: String,
    rating: f64,
    num_reviews: i32,
    created_by: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, reviews: Vec<Review>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            price: self.price,
            image: self.image,
            brand: self.brand,
            category: self.category,
            count_in_stock: self.count_in_stock,
            description: self.description,
            rating: self.rating,
            num_reviews: self.num_reviews,
            reviews,
            created_by: UserId::new(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row for `shop.review`.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    name: String,
    rating: i32,
    comment: String,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            name: row.name,
            rating: row.rating,
            comment: row.comment,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        }
    }
}

const SELECT_PRODUCT: &str = r"
    SELECT id, name, price, image, brand, category, count_in_stock,
           description, rating, num_reviews, created_by, created_at, updated_at
    FROM shop.product
";

/// Whole-record overwrite of the editable product fields.
///
/// The derived `rating`/`num_reviews` columns are deliberately absent: they
/// cannot be set from outside the review-append path.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    /// Product name.
    pub name: String,
    /// Unit price, non-negative.
    pub price: Decimal,
    /// Free-form description.
    pub description: String,
    /// Image reference.
    pub image: String,
    /// Brand name.
    pub brand: String,
    /// Category label.
    pub category: String,
    /// Units in stock, non-negative.
    pub count_in_stock: i32,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Keyword search with offset pagination.
    ///
    /// `keyword`, when present, is a case-insensitive substring match against
    /// the product name. Pages are 1-based and [`PAGE_SIZE`] wide, ordered by
    /// insertion (id). An empty page is a success, not an error; the caller
    /// computes `total_pages` from the returned count.
    ///
    /// Collection rows are served without their review lists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        keyword: Option<&str>,
        page: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let page = page.max(1);
        // "%" matches everything, so the unfiltered listing reuses the same
        // statements.
        let pattern = keyword.map_or_else(|| "%".to_owned(), |kw| format!("%{}%", escape_like(kw)));

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM shop.product WHERE name ILIKE $1")
                .bind(&pattern)
                .fetch_one(self.pool)
                .await?;

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "{SELECT_PRODUCT} WHERE name ILIKE $1 ORDER BY id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(PAGE_SIZE)
        .bind(PAGE_SIZE * (page - 1))
        .fetch_all(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(|row| row.into_product(Vec::new()))
            .collect();

        Ok((products, count))
    }

    /// Get a product by ID, with its reviews in submission order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviews: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT id, name, rating, comment, user_id, created_at
            FROM shop.review
            WHERE product_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(
            row.into_product(reviews.into_iter().map(Review::from).collect()),
        ))
    }

    /// Insert a placeholder product for the scaffold-then-edit workflow.
    ///
    /// The sentinel values ("Sample name", price 0, ...) are what the admin
    /// UI expects to find and overwrite; no field validation happens here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, created_by: UserId) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO shop.product
                (name, price, image, brand, category, count_in_stock, description, created_by)
            VALUES ('Sample name', 0, '/images/sample.jpg', 'Sample brand',
                    'Sample category', 0, 'Sample description', $1)
            RETURNING id, name, price, image, brand, category, count_in_stock,
                      description, rating, num_reviews, created_by, created_at, updated_at
            ",
        )
        .bind(created_by.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_product(Vec::new()))
    }

    /// Overwrite the editable fields in a single UPDATE keyed by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: UpdateProduct,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            UPDATE shop.product
            SET name = $2, price = $3, description = $4, image = $5,
                brand = $6, category = $7, count_in_stock = $8, updated_at = now()
            WHERE id = $1
            RETURNING id, name, price, image, brand, category, count_in_stock,
                      description, rating, num_reviews, created_by, created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(update.name)
        .bind(update.price)
        .bind(update.description)
        .bind(update.image)
        .bind(update.brand)
        .bind(update.category)
        .bind(update.count_in_stock)
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), |r| {
            Ok(r.into_product(Vec::new()))
        })
    }

    /// Delete a product. Its reviews cascade; order-item snapshots that
    /// reference it survive untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn remove(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Append a review and recompute the derived rating columns, as one
    /// atomic unit.
    ///
    /// The product row is locked for the duration of the transaction, so two
    /// concurrent submissions for the same product serialize instead of
    /// racing the recompute. The UNIQUE (product_id, user_id) constraint is
    /// the authority on one-review-per-user; a duplicate surfaces as
    /// `Conflict` with no partial state left behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if this user already reviewed it.
    #[instrument(skip(self, reviewer_name, comment))]
    pub async fn add_review(
        &self,
        id: ProductId,
        reviewer_id: UserId,
        reviewer_name: &str,
        rating: i32,
        comment: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM shop.product WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO shop.review (product_id, user_id, name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id.as_i32())
        .bind(reviewer_id.as_i32())
        .bind(reviewer_name)
        .bind(rating)
        .bind(comment)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "product already reviewed"))?;

        let ratings: Vec<(i32,)> =
            sqlx::query_as("SELECT rating FROM shop.review WHERE product_id = $1")
                .bind(id.as_i32())
                .fetch_all(&mut *tx)
                .await?;
        let ratings: Vec<i32> = ratings.into_iter().map(|(r,)| r).collect();

        sqlx::query(
            r"
            UPDATE shop.product
            SET rating = $2, num_reviews = $3, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(mean_rating(&ratings))
        .bind(i32::try_from(ratings.len()).unwrap_or(i32::MAX))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// The highest-rated products, rating descending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "{SELECT_PRODUCT} ORDER BY rating DESC, id ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_product(Vec::new()))
            .collect())
    }
}

/// Escape `%`, `_` and `\` so a keyword matches literally inside the
/// ILIKE pattern.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("phone"), "phone");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_page_window_math() {
        // Page 2 of a 10-wide window serves rows 11-20.
        let page: i64 = 2;
        assert_eq!(PAGE_SIZE * (page - 1), 10);
        assert_eq!(PAGE_SIZE * (page - 1) + PAGE_SIZE, 20);
    }
}
