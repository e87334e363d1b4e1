//! Public catalog routes — listing, likes, reviews, booking links.
//!
//! Every handler that touches visitor state takes a [`Visitor`] and returns
//! its jar so a freshly minted visitor id is persisted with the response.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::notice::{ApiResult, Notice};
use super::visitor::Visitor;
use crate::services::booking;
use crate::services::catalog::{self, CatalogEntry};
use crate::services::like::{self, LikeError};
use crate::services::product::{self, CATEGORIES, ProductError};
use crate::services::review::{self, RatingSummary, Review, ReviewDraft, ReviewError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub product_id: Uuid,
    pub liked: bool,
    pub like_count: i64,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    #[serde(flatten)]
    pub summary: RatingSummary,
    pub reviews: Vec<Review>,
}

pub(crate) fn product_error_to_notice(err: ProductError) -> Notice {
    match err {
        ProductError::NotFound(_) => Notice::error(StatusCode::NOT_FOUND, "Product not found"),
        ProductError::Invalid(message) => Notice::error(StatusCode::BAD_REQUEST, message),
        ProductError::Database(e) => Notice::internal(&e, "Failed to load products"),
    }
}

pub(crate) fn like_error_to_notice(err: LikeError) -> Notice {
    match err {
        LikeError::ProductNotFound(_) => Notice::error(StatusCode::NOT_FOUND, "Product not found"),
        LikeError::Database(e) => Notice::internal(&e, "Failed to update like"),
    }
}

pub(crate) fn review_error_to_notice(err: ReviewError) -> Notice {
    match err {
        ReviewError::RatingRequired | ReviewError::RatingOutOfRange(_) | ReviewError::TooLong => {
            Notice::error(StatusCode::BAD_REQUEST, err.to_string())
        }
        ReviewError::ProductNotFound(_) => Notice::error(StatusCode::NOT_FOUND, "Product not found"),
        ReviewError::Database(e) => Notice::internal(&e, "Failed to submit review"),
    }
}

/// `GET /api/categories` — filter buttons, `All` first.
pub async fn list_categories() -> Json<&'static [&'static str]> {
    Json(&CATEGORIES[..])
}

/// `GET /api/products?category=` — active catalog for this visitor.
pub async fn list_products(
    State(state): State<AppState>,
    visitor: Visitor,
    jar: CookieJar,
    ApiQuery(query): ApiQuery<CatalogQuery>,
) -> ApiResult<(CookieJar, Json<Vec<CatalogEntry>>)> {
    let entries = catalog::load_catalog(
        &state.pool,
        &state.config.whatsapp_number,
        &visitor.id,
        query.category.as_deref(),
    )
    .await
    .map_err(product_error_to_notice)?;
    Ok((visitor.attach(jar), Json(entries)))
}

/// `GET /api/products/{id}` — one active product.
pub async fn get_product(
    State(state): State<AppState>,
    visitor: Visitor,
    jar: CookieJar,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<(CookieJar, Json<CatalogEntry>)> {
    let entry = catalog::load_entry(&state.pool, &state.config.whatsapp_number, &visitor.id, product_id)
        .await
        .map_err(product_error_to_notice)?;
    Ok((visitor.attach(jar), Json(entry)))
}

/// `POST /api/products/{id}/like` — flip this visitor's like.
pub async fn toggle_like(
    State(state): State<AppState>,
    visitor: Visitor,
    jar: CookieJar,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<(CookieJar, Json<LikeResponse>)> {
    let summary = like::toggle_like(&state.pool, product_id, &visitor.id)
        .await
        .map_err(like_error_to_notice)?;
    let body = LikeResponse {
        product_id,
        liked: summary.liked,
        like_count: summary.like_count,
        message: like_message(summary.liked),
    };
    Ok((visitor.attach(jar), Json(body)))
}

fn like_message(liked: bool) -> &'static str {
    if liked { "Added to favorites" } else { "Removed from favorites" }
}

/// `GET /api/products/{id}/reviews` — newest first, with the summary.
/// Inactive and missing products are 404, same as the product itself.
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<Json<ReviewsResponse>> {
    product::get_active(&state.pool, product_id)
        .await
        .map_err(product_error_to_notice)?;
    let reviews = review::list_reviews(&state.pool, product_id)
        .await
        .map_err(review_error_to_notice)?;
    let ratings: Vec<i16> = reviews.iter().map(|r| r.rating).collect();
    Ok(Json(ReviewsResponse { summary: RatingSummary::from_ratings(&ratings), reviews }))
}

/// `POST /api/products/{id}/reviews` — validated before any query runs.
pub async fn submit_review(
    State(state): State<AppState>,
    visitor: Visitor,
    jar: CookieJar,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<ReviewDraft>,
) -> ApiResult<(StatusCode, CookieJar, Json<Review>)> {
    let new_review = draft.validate().map_err(review_error_to_notice)?;
    let created = review::submit_review(&state.pool, product_id, &visitor.id, new_review)
        .await
        .map_err(review_error_to_notice)?;
    Ok((StatusCode::CREATED, visitor.attach(jar), Json(created)))
}

/// `GET /api/products/{id}/book` — hand off to WhatsApp.
pub async fn book_product(State(state): State<AppState>, ApiPath(product_id): ApiPath<Uuid>) -> ApiResult<Redirect> {
    let product = product::get_active(&state.pool, product_id)
        .await
        .map_err(product_error_to_notice)?;
    tracing::info!(%product_id, "booking handoff");
    Ok(Redirect::to(&booking::product_booking_link(&state.config.whatsapp_number, &product.name)))
}

/// `GET /book` — general inquiry chat.
pub async fn book_inquiry(State(state): State<AppState>) -> impl IntoResponse {
    Redirect::to(&booking::inquiry_link(&state.config.whatsapp_number))
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
