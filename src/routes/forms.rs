//! HTML form posts for the server-rendered pages.
//!
//! Each handler answers a successful post with a `303 See Other` back to a
//! page, and a failed one by re-rendering the page it came from with the
//! error shown inline. Admin forms redirect to the login page instead of
//! returning 401 when the session is gone.

use axum::Form;
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use super::admin::admin_error_to_notice;
use super::auth::AdminUser;
use super::notice::Notice;
use super::pages::{dashboard_page, not_found, placeholder, product_page};
use super::products::{like_error_to_notice, review_error_to_notice};
use super::visitor::Visitor;
use crate::services::like::{self, LikeError};
use crate::services::product::{self, ProductError, ProductInput, ProductPatch};
use crate::services::review::{self, ReviewDraft, ReviewError};
use crate::site::pages::{self as site_pages, DASHBOARD_PATH, LOGIN_PATH};
use crate::state::AppState;

fn form_rejection_to_notice(rejection: &FormRejection) -> Notice {
    tracing::debug!(detail = %rejection.body_text(), "form rejected");
    Notice::error(rejection.status(), "Invalid form submission")
}

/// Where a like form sends the visitor back to. Only same-site paths are
/// followed.
fn return_target(next: &str, product_id: Uuid) -> String {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next.to_owned()
    } else {
        site_pages::product_path(product_id)
    }
}

// =============================================================================
// VISITOR FORMS
// =============================================================================

#[derive(Deserialize, Default)]
pub struct LikeForm {
    #[serde(default)]
    pub next: String,
}

/// `POST /products/{id}/like`
pub async fn like_form(
    State(state): State<AppState>,
    visitor: Visitor,
    jar: CookieJar,
    path: Result<Path<Uuid>, PathRejection>,
    form: Result<Form<LikeForm>, FormRejection>,
) -> Response {
    let Ok(Path(product_id)) = path else {
        return not_found(&state);
    };
    let form = form.map(|Form(f)| f).unwrap_or_default();

    let response = match like::toggle_like(&state.pool, product_id, &visitor.id).await {
        Ok(summary) => {
            tracing::debug!(%product_id, liked = summary.liked, "like toggled from form");
            Redirect::to(&return_target(&form.next, product_id)).into_response()
        }
        Err(LikeError::ProductNotFound(_)) => not_found(&state),
        Err(e) => {
            let notice = like_error_to_notice(e);
            product_page(&state, &visitor, product_id, Some(&notice.message), notice.status).await
        }
    };
    (visitor.attach(jar), response).into_response()
}

/// `POST /products/{id}/reviews`
pub async fn review_form(
    State(state): State<AppState>,
    visitor: Visitor,
    jar: CookieJar,
    path: Result<Path<Uuid>, PathRejection>,
    form: Result<Form<ReviewDraft>, FormRejection>,
) -> Response {
    let Ok(Path(product_id)) = path else {
        return not_found(&state);
    };

    let notice = match form {
        Err(rejection) => form_rejection_to_notice(&rejection),
        Ok(Form(draft)) => match draft.validate() {
            Err(e) => review_error_to_notice(e),
            Ok(new_review) => match review::submit_review(&state.pool, product_id, &visitor.id, new_review).await {
                Ok(_) => {
                    let target = site_pages::product_path(product_id);
                    return (visitor.attach(jar), Redirect::to(&target)).into_response();
                }
                Err(ReviewError::ProductNotFound(_)) => return not_found(&state),
                Err(e) => review_error_to_notice(e),
            },
        },
    };

    let response = product_page(&state, &visitor, product_id, Some(&notice.message), notice.status).await;
    (visitor.attach(jar), response).into_response()
}

// =============================================================================
// ADMIN FORMS
// =============================================================================

/// Add/edit product form. Every field arrives as text; an unchecked
/// checkbox is simply absent.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl ProductForm {
    fn price(&self) -> Result<f64, ProductError> {
        self.price
            .trim()
            .parse()
            .map_err(|_| ProductError::Invalid("Price must be a non-negative number"))
    }

    fn image_url(&self) -> Option<String> {
        Some(self.image_url.trim().to_owned()).filter(|u| !u.is_empty())
    }

    /// # Errors
    ///
    /// `Invalid` when the price is not a number.
    pub fn into_input(self) -> Result<ProductInput, ProductError> {
        Ok(ProductInput {
            price: self.price()?,
            image_url: self.image_url(),
            is_active: self.is_active.is_some(),
            name: self.name,
            description: self.description,
            category: self.category,
        })
    }

    /// A full patch: the edit form always carries every field, so an empty
    /// image URL clears the image.
    ///
    /// # Errors
    ///
    /// `Invalid` when the price is not a number.
    pub fn into_patch(self) -> Result<ProductPatch, ProductError> {
        Ok(ProductPatch {
            price: Some(self.price()?),
            image_url: Some(self.image_url()),
            is_active: Some(self.is_active.is_some()),
            name: Some(self.name),
            description: Some(self.description),
            category: Some(self.category),
        })
    }
}

/// A rejected [`AdminUser`] on a page form: placeholder while auth is
/// unavailable, otherwise back to the login page.
fn admin_rejection(state: &AppState, notice: &Notice) -> Response {
    if notice.status == StatusCode::SERVICE_UNAVAILABLE {
        placeholder(state)
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

async fn admin_outcome(state: &AppState, admin: &AdminUser, result: Result<(), Notice>) -> Response {
    match result {
        Ok(()) => Redirect::to(DASHBOARD_PATH).into_response(),
        Err(notice) => dashboard_page(state, &admin.session.email, Some(&notice.message), notice.status).await,
    }
}

/// `POST /admin/products`
pub async fn create_product_form(
    State(state): State<AppState>,
    admin: Result<AdminUser, Notice>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let admin = match admin {
        Ok(admin) => admin,
        Err(notice) => return admin_rejection(&state, &notice),
    };

    let result = async {
        let Form(form) = form.map_err(|r| form_rejection_to_notice(&r))?;
        let input = form.into_input().map_err(|e| admin_error_to_notice(e, "create"))?;
        let valid = product::validate_product(input).map_err(|e| admin_error_to_notice(e, "create"))?;
        let created = product::create(&state.pool, valid)
            .await
            .map_err(|e| admin_error_to_notice(e, "create"))?;
        tracing::info!(admin = %admin.session.email, product_id = %created.id, "admin created product from form");
        Ok::<(), Notice>(())
    }
    .await;
    admin_outcome(&state, &admin, result).await
}

/// `POST /admin/products/{id}`
pub async fn update_product_form(
    State(state): State<AppState>,
    admin: Result<AdminUser, Notice>,
    path: Result<Path<Uuid>, PathRejection>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let admin = match admin {
        Ok(admin) => admin,
        Err(notice) => return admin_rejection(&state, &notice),
    };
    let Ok(Path(product_id)) = path else {
        return not_found(&state);
    };

    let result = async {
        let Form(form) = form.map_err(|r| form_rejection_to_notice(&r))?;
        let patch = form.into_patch().map_err(|e| admin_error_to_notice(e, "update"))?;
        product::update(&state.pool, product_id, patch)
            .await
            .map_err(|e| admin_error_to_notice(e, "update"))?;
        tracing::info!(admin = %admin.session.email, %product_id, "admin updated product from form");
        Ok::<(), Notice>(())
    }
    .await;
    admin_outcome(&state, &admin, result).await
}

/// `POST /admin/products/{id}/delete`
pub async fn delete_product_form(
    State(state): State<AppState>,
    admin: Result<AdminUser, Notice>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let admin = match admin {
        Ok(admin) => admin,
        Err(notice) => return admin_rejection(&state, &notice),
    };
    let Ok(Path(product_id)) = path else {
        return not_found(&state);
    };

    let result = product::delete(&state.pool, product_id)
        .await
        .map_err(|e| admin_error_to_notice(e, "delete"));
    if result.is_ok() {
        tracing::info!(admin = %admin.session.email, %product_id, "admin deleted product from form");
    }
    admin_outcome(&state, &admin, result).await
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
