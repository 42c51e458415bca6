//! Product and review domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use orchard_core::{ProductId, ReviewId, UserId};

/// A catalog product.
///
/// `rating` and `num_reviews` are derived: `rating` is the mean of the
/// attached review ratings (0 when there are none) and `num_reviews` their
/// count. Both are recomputed in the same transaction that appends a review
/// and are never accepted from clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name, matched by keyword search.
    pub name: String,
    /// Unit price, non-negative.
    pub price: Decimal,
    /// Image reference (path or URL).
    pub image: String,
    /// Brand name.
    pub brand: String,
    /// Category label.
    pub category: String,
    /// Units in stock, non-negative.
    pub count_in_stock: i32,
    /// Free-form description.
    pub description: String,
    /// Mean review rating, 0.0 to 5.0.
    pub rating: f64,
    /// Number of attached reviews.
    pub num_reviews: i32,
    /// Reviews in submission order. Collection endpoints serve this empty;
    /// the detail endpoint populates it.
    pub reviews: Vec<Review>,
    /// Admin who created the record (lookup key only).
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A review, owned exclusively by one product.
///
/// `name` is a snapshot of the reviewer's display name at submission time;
/// later profile renames do not rewrite history. A given user may review a
/// given product at most once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review ID (unique within the store, not independently addressable).
    pub id: ReviewId,
    /// Reviewer display name snapshot.
    pub name: String,
    /// Integer rating, 1 to 5.
    pub rating: i32,
    /// Free-form comment.
    pub comment: String,
    /// Reviewer user ID, used for the one-review-per-user check.
    pub user_id: UserId,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Mean of review ratings, 0 when there are none.
///
/// Called from the review-append transaction to recompute the product's
/// stored `rating` after every insert.
#[must_use]
pub fn mean_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)] // review counts are far below 2^52
    {
        f64::from(ratings.iter().sum::<i32>()) / ratings.len() as f64
    }
}
