//! Server-rendered pages.
//!
//! Every GET that no API route claims lands here. The path goes through
//! a per-request [`Navigator`] over the site route table, and the outcome
//! decides between a page, the loading placeholder, a redirect, or 404.

use axum::extract::{Query, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use super::auth::session_token;
use super::visitor::Visitor;
use crate::services::product::{self, ALL_CATEGORIES, ProductError};
use crate::services::{catalog, review};
use crate::site::auth::AuthState;
use crate::site::pages::{self, DashboardPage, HomePage, LoginPage, ProductPage, View};
use crate::site::router::{Navigator, Outcome};
use crate::state::AppState;

const RETRY_AFTER_SECS: &str = "2";

pub async fn render_page(State(state): State<AppState>, uri: Uri, visitor: Visitor, jar: CookieJar) -> Response {
    let auth = state.auth.restore(session_token(&jar)).await;
    let mut navigator = Navigator::new(state.site_routes.clone());

    match navigator.render(uri.path(), &auth) {
        Outcome::NotFound => not_found(&state),
        Outcome::Placeholder => placeholder(&state),
        Outcome::Redirect(target) => {
            tracing::debug!(from = %uri.path(), to = %navigator.current_path(), "guard redirect");
            Redirect::to(&target).into_response()
        }
        Outcome::Render(View::Home) => {
            let category = category_param(&uri);
            let response = home(&state, &visitor, category.as_deref()).await;
            (visitor.attach(jar), response).into_response()
        }
        Outcome::Render(View::Product) => {
            let Some(product_id) = pages::product_id_from_path(navigator.current_path()) else {
                return not_found(&state);
            };
            let response = product_page(&state, &visitor, product_id, None, StatusCode::OK).await;
            (visitor.attach(jar), response).into_response()
        }
        Outcome::Render(View::AdminLogin) => match auth {
            AuthState::Authenticated(_) => Redirect::to(pages::DASHBOARD_PATH).into_response(),
            AuthState::Loading => placeholder(&state),
            AuthState::Unauthenticated => html_page(
                StatusCode::OK,
                state.pages.login(&LoginPage { email: "", code_sent: false, error: None }),
            ),
        },
        Outcome::Render(View::AdminDashboard) => match auth.session() {
            Some(session) => dashboard_page(&state, &session.email, None, StatusCode::OK).await,
            None => Redirect::to(pages::LOGIN_PATH).into_response(),
        },
    }
}

/// First `category` value in the query string. Anything unparseable or
/// repeated is read leniently rather than rejected.
fn category_param(uri: &Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    pairs
        .into_iter()
        .find_map(|(key, value)| (key == "category").then_some(value))
}

/// Wrap a template render. A render failure is logged and served as a bare 500.
pub(crate) fn html_page(status: StatusCode, rendered: Result<String, tera::Error>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub(crate) fn placeholder(state: &AppState) -> Response {
    let response = html_page(StatusCode::SERVICE_UNAVAILABLE, state.pages.loading());
    ([(RETRY_AFTER, RETRY_AFTER_SECS)], response).into_response()
}

pub(crate) fn not_found(state: &AppState) -> Response {
    html_page(StatusCode::NOT_FOUND, state.pages.not_found())
}

async fn home(state: &AppState, visitor: &Visitor, category: Option<&str>) -> Response {
    let selected_category = product::category_filter(category).unwrap_or(ALL_CATEGORIES);

    match catalog::load_catalog(&state.pool, &state.config.whatsapp_number, &visitor.id, category).await {
        Ok(entries) => html_page(
            StatusCode::OK,
            state.pages.home(&HomePage { entries: &entries, selected_category, error: None }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "catalog load failed");
            html_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                state.pages.home(&HomePage {
                    entries: &[],
                    selected_category,
                    error: Some("Failed to load products"),
                }),
            )
        }
    }
}

/// Product detail with its reviews. `error` and `status` let the review
/// form re-render the page with a validation message.
pub(crate) async fn product_page(
    state: &AppState,
    visitor: &Visitor,
    product_id: Uuid,
    error: Option<&str>,
    status: StatusCode,
) -> Response {
    let entry = match catalog::load_entry(&state.pool, &state.config.whatsapp_number, &visitor.id, product_id).await {
        Ok(entry) => entry,
        Err(ProductError::NotFound(_)) => return not_found(state),
        Err(e) => {
            tracing::error!(error = %e, %product_id, "product load failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load product").into_response();
        }
    };
    let reviews = match review::list_reviews(&state.pool, product_id).await {
        Ok(reviews) => reviews,
        Err(e) => {
            tracing::error!(error = %e, %product_id, "review load failed");
            Vec::new()
        }
    };
    html_page(status, state.pages.product(&ProductPage { entry: &entry, reviews: &reviews, error }))
}

/// Admin dashboard listing every product. Form handlers reuse it to show
/// their validation errors.
pub(crate) async fn dashboard_page(
    state: &AppState,
    admin_email: &str,
    error: Option<&str>,
    status: StatusCode,
) -> Response {
    match product::list_all(&state.pool).await {
        Ok(products) => html_page(
            status,
            state.pages.dashboard(&DashboardPage { admin_email, products: &products, error }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "admin product list failed");
            html_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                state.pages.dashboard(&DashboardPage {
                    admin_email,
                    products: &[],
                    error: Some("Failed to load products"),
                }),
            )
        }
    }
}
