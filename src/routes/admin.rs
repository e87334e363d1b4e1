//! Admin product management. Every handler requires [`AdminUser`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use super::auth::AdminUser;
use super::extract::{ApiJson, ApiPath};
use super::notice::{ApiResult, Notice};
use crate::services::product::{self, Product, ProductError, ProductInput, ProductPatch};
use crate::state::AppState;

pub(crate) fn admin_error_to_notice(err: ProductError, action: &str) -> Notice {
    match err {
        ProductError::Database(e) => Notice::internal(&e, &format!("Failed to {action} product")),
        other => super::products::product_error_to_notice(other),
    }
}

/// `GET /api/admin/products` — every product, inactive included.
pub async fn list_products(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Product>>> {
    let products = product::list_all(&state.pool)
        .await
        .map_err(|e| admin_error_to_notice(e, "load"))?;
    Ok(Json(products))
}

/// `POST /api/admin/products`
pub async fn create_product(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let valid = product::validate_product(input).map_err(|e| admin_error_to_notice(e, "create"))?;
    let created = product::create(&state.pool, valid)
        .await
        .map_err(|e| admin_error_to_notice(e, "create"))?;
    tracing::info!(admin = %admin.session.email, product_id = %created.id, "admin created product");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/admin/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<Json<Product>> {
    let found = product::get(&state.pool, product_id)
        .await
        .map_err(|e| admin_error_to_notice(e, "load"))?;
    Ok(Json(found))
}

/// `PATCH /api/admin/products/{id}` — absent fields are left alone.
pub async fn update_product(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let updated = product::update(&state.pool, product_id, patch)
        .await
        .map_err(|e| admin_error_to_notice(e, "update"))?;
    tracing::info!(admin = %admin.session.email, %product_id, "admin updated product");
    Ok(Json(updated))
}

/// `DELETE /api/admin/products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    admin: AdminUser,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    product::delete(&state.pool, product_id)
        .await
        .map_err(|e| admin_error_to_notice(e, "delete"))?;
    tracing::info!(admin = %admin.session.email, %product_id, "admin deleted product");
    Ok(StatusCode::NO_CONTENT)
}
