//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON endpoints live under `/api`, HTML form posts under `/products` and
//! `/admin`, static assets under `/static`. Every other GET falls through to
//! the page renderer, which owns the site's own route table and guard.

pub mod admin;
pub mod auth;
pub mod extract;
pub mod forms;
pub mod notice;
pub mod pages;
pub mod products;
pub mod visitor;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/categories", get(products::list_categories))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/products/{id}/like", post(products::toggle_like))
        .route(
            "/api/products/{id}/reviews",
            get(products::list_reviews).post(products::submit_review),
        )
        .route("/api/products/{id}/book", get(products::book_product))
        .route("/api/auth/otp/request", post(auth::request_otp))
        .route("/api/auth/otp/verify", post(auth::verify_otp))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            get(admin::get_product)
                .patch(admin::update_product)
                .delete(admin::delete_product),
        )
        .layer(cors)
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(api_routes())
        .route("/healthz", get(healthz))
        .route("/book", get(products::book_inquiry))
        .route("/admin/login", get(pages::render_page).post(auth::login_form))
        .route("/admin/logout", get(auth::logout_page).post(auth::logout_form))
        .route("/products/{id}/like", get(pages::render_page).post(forms::like_form))
        .route("/products/{id}/reviews", get(pages::render_page).post(forms::review_form))
        .route("/admin/products", get(pages::render_page).post(forms::create_product_form))
        .route("/admin/products/{id}", get(pages::render_page).post(forms::update_product_form))
        .route("/admin/products/{id}/delete", get(pages::render_page).post(forms::delete_product_form))
        .nest_service("/static", static_files)
        .fallback(pages::render_page)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
