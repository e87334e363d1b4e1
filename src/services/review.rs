//! Product reviews left by anonymous visitors.
//!
//! Drafts are validated before any query runs: a rating of 0 is the form's
//! "nothing selected" state and never reaches the database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
const MAX_REVIEW_LEN: usize = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Please select a rating")]
    RatingRequired,
    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange(i64),
    #[error("Review is too long")]
    TooLong,
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Review as submitted by a visitor. The rating is wide so an oversized
/// value fails validation instead of deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDraft {
    #[serde(default)]
    pub rating: i64,
    #[serde(default)]
    pub review_text: Option<String>,
}

/// A draft that passed [`ReviewDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub rating: i16,
    pub review_text: Option<String>,
}

impl ReviewDraft {
    /// # Errors
    ///
    /// `RatingRequired` for 0, `RatingOutOfRange` outside 1..=5, `TooLong` for
    /// oversized text.
    pub fn validate(self) -> Result<NewReview, ReviewError> {
        if self.rating == 0 {
            return Err(ReviewError::RatingRequired);
        }
        let rating = i16::try_from(self.rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or(ReviewError::RatingOutOfRange(self.rating))?;
        let review_text = self
            .review_text
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        if review_text
            .as_ref()
            .is_some_and(|t| t.chars().count() > MAX_REVIEW_LEN)
        {
            return Err(ReviewError::TooLong);
        }
        Ok(NewReview { rating, review_text })
    }
}

/// Public view of a `product_reviews` row. The visitor session id stays
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub rating: i16,
    pub review_text: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean rating, 0 when there are no reviews.
    pub average_rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn from_ratings(ratings: &[i16]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        let count = ratings.len() as i64;
        Self { average_rating: total as f64 / count as f64, review_count: count }
    }
}

/// Reviews for a product, newest first.
pub async fn list_reviews(pool: &PgPool, product_id: Uuid) -> Result<Vec<Review>, ReviewError> {
    let rows = sqlx::query(
        r#"SELECT id, product_id, rating, review_text,
                  to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
           FROM product_reviews
           WHERE product_id = $1
           ORDER BY created_at DESC"#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Review {
            id: r.get("id"),
            product_id: r.get("product_id"),
            rating: r.get("rating"),
            review_text: r.get("review_text"),
            created_at: r.get("created_at"),
        })
        .collect())
}

/// Rating summaries for many products. Products without reviews are absent.
pub async fn summaries(pool: &PgPool, product_ids: &[Uuid]) -> Result<HashMap<Uuid, RatingSummary>, sqlx::Error> {
    let rows = sqlx::query("SELECT product_id, rating FROM product_reviews WHERE product_id = ANY($1)")
        .bind(product_ids)
        .fetch_all(pool)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<i16>> = HashMap::new();
    for row in &rows {
        grouped
            .entry(row.get("product_id"))
            .or_default()
            .push(row.get("rating"));
    }
    Ok(grouped
        .into_iter()
        .map(|(id, ratings)| (id, RatingSummary::from_ratings(&ratings)))
        .collect())
}

/// Store a validated review for an active product.
///
/// # Errors
///
/// Returns `ProductNotFound` for missing or inactive products.
pub async fn submit_review(
    pool: &PgPool,
    product_id: Uuid,
    session_id: &str,
    review: NewReview,
) -> Result<Review, ReviewError> {
    let row = sqlx::query(
        r#"INSERT INTO product_reviews (product_id, rating, review_text, user_session_id)
           SELECT id, $2, $3, $4 FROM products WHERE id = $1 AND is_active
           RETURNING id, product_id, rating, review_text,
                     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#,
    )
    .bind(product_id)
    .bind(review.rating)
    .bind(&review.review_text)
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ReviewError::ProductNotFound(product_id))?;

    tracing::info!(%product_id, rating = review.rating, "review submitted");
    Ok(Review {
        id: row.get("id"),
        product_id: row.get("product_id"),
        rating: row.get("rating"),
        review_text: row.get("review_text"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
#[path = "review_test.rs"]
mod tests;
