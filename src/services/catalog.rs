//! Catalog entries: products joined with like and rating summaries.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::booking;
use super::like::{self, LikeSummary};
use super::product::{self, Product, ProductError};
use super::review::{self, RatingSummary};

/// A product as shown to visitors.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: Product,
    #[serde(flatten)]
    pub likes: LikeSummary,
    #[serde(flatten)]
    pub rating: RatingSummary,
    pub booking_url: String,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(product: Product, likes: LikeSummary, rating: RatingSummary, whatsapp_number: &str) -> Self {
        let booking_url = booking::product_booking_link(whatsapp_number, &product.name);
        Self { product, likes, rating, booking_url }
    }
}

/// Active catalog for one visitor, newest first.
///
/// # Errors
///
/// Returns a database error if any of the three queries fail.
pub async fn load_catalog(
    pool: &PgPool,
    whatsapp_number: &str,
    session_id: &str,
    category: Option<&str>,
) -> Result<Vec<CatalogEntry>, ProductError> {
    let products = product::list_active(pool, category).await?;
    decorate(pool, whatsapp_number, session_id, products).await
}

/// One active product for one visitor.
///
/// # Errors
///
/// Returns `NotFound` for missing or inactive products.
pub async fn load_entry(
    pool: &PgPool,
    whatsapp_number: &str,
    session_id: &str,
    product_id: Uuid,
) -> Result<CatalogEntry, ProductError> {
    let product = product::get_active(pool, product_id).await?;
    decorate(pool, whatsapp_number, session_id, vec![product])
        .await?
        .pop()
        .ok_or(ProductError::NotFound(product_id))
}

async fn decorate(
    pool: &PgPool,
    whatsapp_number: &str,
    session_id: &str,
    products: Vec<Product>,
) -> Result<Vec<CatalogEntry>, ProductError> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let likes = like::summaries(pool, &ids, session_id).await?;
    let ratings = review::summaries(pool, &ids).await?;

    Ok(products
        .into_iter()
        .map(|p| {
            let like = likes.get(&p.id).copied().unwrap_or_default();
            let rating = ratings.get(&p.id).copied().unwrap_or_default();
            CatalogEntry::new(p, like, rating, whatsapp_number)
        })
        .collect())
}
