//! Product likes attributed to anonymous visitor sessions.
//!
//! A like is a `(product_id, user_session_id)` row; the unique constraint
//! makes a visitor's like idempotent. Toggling reads the visitor's current
//! state inside a transaction and flips it.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Like count for a product plus whether the current visitor is among them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LikeSummary {
    pub like_count: i64,
    pub liked: bool,
}

impl LikeSummary {
    /// The summary after the visitor flips their like.
    #[must_use]
    pub fn toggled(self) -> Self {
        if self.liked {
            Self { like_count: (self.like_count - 1).max(0), liked: false }
        } else {
            Self { like_count: self.like_count + 1, liked: true }
        }
    }
}

/// Like summaries for many products at once. Products without likes are
/// absent from the map.
pub async fn summaries(
    pool: &PgPool,
    product_ids: &[Uuid],
    session_id: &str,
) -> Result<HashMap<Uuid, LikeSummary>, sqlx::Error> {
    let rows = sqlx::query(
        r"SELECT product_id,
                 COUNT(*) AS like_count,
                 bool_or(user_session_id = $2) AS liked
          FROM product_likes
          WHERE product_id = ANY($1)
          GROUP BY product_id",
    )
    .bind(product_ids)
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| {
            let summary = LikeSummary { like_count: r.get("like_count"), liked: r.get("liked") };
            (r.get("product_id"), summary)
        })
        .collect())
}

/// Like or unlike `product_id` on behalf of `session_id`.
///
/// # Errors
///
/// Returns `ProductNotFound` for missing or inactive products.
pub async fn toggle_like(pool: &PgPool, product_id: Uuid, session_id: &str) -> Result<LikeSummary, LikeError> {
    let mut tx = pool.begin().await?;

    let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM products WHERE id = $1 FOR SHARE")
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;
    if active != Some(true) {
        return Err(LikeError::ProductNotFound(product_id));
    }

    let row = sqlx::query(
        r"SELECT COUNT(*) AS like_count,
                 COALESCE(bool_or(user_session_id = $2), false) AS liked
          FROM product_likes
          WHERE product_id = $1",
    )
    .bind(product_id)
    .bind(session_id)
    .fetch_one(&mut *tx)
    .await?;
    let current = LikeSummary { like_count: row.get("like_count"), liked: row.get("liked") };

    if current.liked {
        sqlx::query("DELETE FROM product_likes WHERE product_id = $1 AND user_session_id = $2")
            .bind(product_id)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query(
            "INSERT INTO product_likes (product_id, user_session_id) VALUES ($1, $2)
             ON CONFLICT (product_id, user_session_id) DO NOTHING",
        )
        .bind(product_id)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(current.toggled())
}

#[cfg(test)]
#[path = "like_test.rs"]
mod tests;
