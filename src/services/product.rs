//! Product catalog service — public selects and admin CRUD.
//!
//! DESIGN
//! ======
//! Public reads only ever see `is_active` rows, newest first. Admin reads see
//! everything. Writes go through [`validate_product`] so the category list
//! and price rules live in one place.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// Filter value meaning "no category filter". Never stored on a product.
pub const ALL_CATEGORIES: &str = "All";

pub const CATEGORIES: [&str; 11] = [
    ALL_CATEGORIES,
    "Bouncing Castles",
    "Slides",
    "Wall Climbers",
    "Mascots",
    "Cotton Candy",
    "Trampolines",
    "Horse and Camel Riding",
    "Quadbikes and Go Carts",
    "Boat Riding",
    "Trains",
];

const MAX_NAME_LEN: usize = 200;

const PRODUCT_COLUMNS: &str = r#"id, name, description, price, category, image_url, is_active,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    to_char(updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at"#;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row of the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Daily rental price in KSh.
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Admin create body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Admin update body. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    /// `Some(None)` clears the image; absent leaves it alone.
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Input that passed [`validate_product`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub is_active: bool,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn is_product_category(category: &str) -> bool {
    category != ALL_CATEGORIES && CATEGORIES.contains(&category)
}

/// Map a `?category=` value to an optional SQL filter.
#[must_use]
pub fn category_filter(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
}

/// Trim and check a product before it is written.
///
/// # Errors
///
/// Returns `ProductError::Invalid` naming the first rule that failed.
pub fn validate_product(input: ProductInput) -> Result<ValidProduct, ProductError> {
    let name = input.name.trim().to_owned();
    if name.is_empty() {
        return Err(ProductError::Invalid("Product name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProductError::Invalid("Product name is too long"));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(ProductError::Invalid("Price must be a non-negative number"));
    }
    let category = input.category.trim().to_owned();
    if !is_product_category(&category) {
        return Err(ProductError::Invalid("Unknown category"));
    }
    let image_url = input
        .image_url
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty());

    Ok(ValidProduct {
        name,
        description: input.description.trim().to_owned(),
        price: input.price,
        category,
        image_url,
        is_active: input.is_active,
    })
}

/// Overlay `patch` on `existing` and validate the result.
///
/// # Errors
///
/// Same as [`validate_product`].
pub fn merge_patch(existing: &Product, patch: ProductPatch) -> Result<ValidProduct, ProductError> {
    validate_product(ProductInput {
        name: patch.name.unwrap_or_else(|| existing.name.clone()),
        description: patch.description.unwrap_or_else(|| existing.description.clone()),
        price: patch.price.unwrap_or(existing.price),
        category: patch.category.unwrap_or_else(|| existing.category.clone()),
        image_url: patch.image_url.unwrap_or_else(|| existing.image_url.clone()),
        is_active: patch.is_active.unwrap_or(existing.is_active),
    })
}

// =============================================================================
// QUERIES
// =============================================================================

fn product_from_row(row: &PgRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Active products, newest first, optionally restricted to one category.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_active(pool: &PgPool, category: Option<&str>) -> Result<Vec<Product>, ProductError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products
         WHERE is_active AND ($1::text IS NULL OR category = $1)
         ORDER BY created_at DESC"
    );
    let rows = sqlx::query(&sql)
        .bind(category_filter(category))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(product_from_row).collect())
}

/// One active product.
///
/// # Errors
///
/// Returns `NotFound` for missing or inactive products.
pub async fn get_active(pool: &PgPool, id: Uuid) -> Result<Product, ProductError> {
    let product = get(pool, id).await?;
    if !product.is_active {
        return Err(ProductError::NotFound(id));
    }
    Ok(product)
}

/// Every product, including inactive ones, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>, ProductError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(product_from_row).collect())
}

/// # Errors
///
/// Returns `NotFound` if no row has this id.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Product, ProductError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ProductError::NotFound(id))?;
    Ok(product_from_row(&row))
}

/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn create(pool: &PgPool, product: ValidProduct) -> Result<Product, ProductError> {
    let sql = format!(
        "INSERT INTO products (name, description, price, category, image_url, is_active)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {PRODUCT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.is_active)
        .fetch_one(pool)
        .await?;
    let created = product_from_row(&row);
    tracing::info!(product_id = %created.id, name = %created.name, "product created");
    Ok(created)
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns `NotFound`, `Invalid` for a bad merged result, or a database error.
pub async fn update(pool: &PgPool, id: Uuid, patch: ProductPatch) -> Result<Product, ProductError> {
    let existing = get(pool, id).await?;
    let product = merge_patch(&existing, patch)?;

    let sql = format!(
        "UPDATE products
         SET name = $2, description = $3, price = $4, category = $5,
             image_url = $6, is_active = $7, updated_at = now()
         WHERE id = $1
         RETURNING {PRODUCT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.is_active)
        .fetch_optional(pool)
        .await?
        .ok_or(ProductError::NotFound(id))?;
    tracing::info!(product_id = %id, "product updated");
    Ok(product_from_row(&row))
}

/// Delete a product. Likes and reviews cascade.
///
/// # Errors
///
/// Returns `NotFound` if no row was deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ProductError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ProductError::NotFound(id));
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(())
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
