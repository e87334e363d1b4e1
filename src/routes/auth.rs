//! Admin auth routes — OTP request/verify, session cookie, sign-out.
//!
//! The JSON endpoints back API clients; the form endpoints back the
//! server-rendered login page so sign-in works without JavaScript.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use super::extract::ApiJson;
use super::notice::{ApiResult, Notice};
use super::pages::html_page;
use crate::services::otp::OtpError;
use crate::services::session::AdminSession;
use crate::site::auth::AuthState;
use crate::site::pages::{self, LoginPage};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin_session";
const SESSION_MAX_AGE_DAYS: i64 = 7;

pub(crate) fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Bad email, non-admin email, bad code, and expired code all read the same.
pub(crate) fn otp_error_to_notice(err: OtpError) -> Notice {
    match err {
        OtpError::InvalidEmail | OtpError::NotAdmin | OtpError::InvalidCode | OtpError::VerificationFailed => {
            Notice::error(StatusCode::UNAUTHORIZED, "Invalid email or code")
        }
        OtpError::RateLimited(e) => {
            tracing::warn!(error = %e, "otp request rate limited");
            Notice::error(StatusCode::TOO_MANY_REQUESTS, "Too many code requests, try again later")
        }
        OtpError::EmailDelivery(e) => {
            tracing::error!(error = %e, "otp email delivery failed");
            Notice::error(StatusCode::BAD_GATEWAY, "Could not send the sign-in code")
        }
        OtpError::Db(e) => Notice::internal(&e, "Sign-in failed"),
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Signed-in admin extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AdminUser {
    pub session: AdminSession,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Notice;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = session_token(&jar) else {
            return Err(Notice::error(StatusCode::UNAUTHORIZED, "Sign in required"));
        };

        let app_state = AppState::from_ref(state);
        match app_state.auth.restore(Some(token)).await {
            AuthState::Authenticated(session) => Ok(Self { session, token: token.to_owned() }),
            AuthState::Unauthenticated => Err(Notice::error(StatusCode::UNAUTHORIZED, "Sign in required")),
            AuthState::Loading => Err(Notice::error(StatusCode::SERVICE_UNAVAILABLE, "Please try again shortly")),
        }
    }
}

// =============================================================================
// JSON HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct OtpRequestBody {
    pub email: String,
}

#[derive(Deserialize)]
pub struct OtpVerifyBody {
    pub email: String,
    pub code: String,
}

/// `POST /api/auth/otp/request` — email a sign-in code to an admin.
pub async fn request_otp(State(state): State<AppState>, ApiJson(body): ApiJson<OtpRequestBody>) -> ApiResult<Notice> {
    state
        .auth
        .send_otp(&body.email)
        .await
        .map_err(otp_error_to_notice)?;
    Ok(Notice::info("We emailed you a sign-in code"))
}

/// `POST /api/auth/otp/verify` — exchange a code for a session cookie.
pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<OtpVerifyBody>,
) -> ApiResult<(CookieJar, Notice)> {
    let token = state
        .auth
        .verify_otp(&body.email, &body.code)
        .await
        .map_err(otp_error_to_notice)?;
    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, Notice::success("Login successful")))
}

/// `GET /api/auth/me` — current admin.
pub async fn me(admin: AdminUser) -> Json<AdminSession> {
    Json(admin.session)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, admin: AdminUser) -> impl IntoResponse {
    if let Err(e) = state.auth.sign_out(&admin.token).await {
        tracing::error!(error = %e, "session delete failed");
    }
    let jar = CookieJar::new().add(cleared_session_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

// =============================================================================
// FORM HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    #[serde(default)]
    pub code: String,
}

/// `POST /admin/login` — send a code when none was given, otherwise verify it.
pub async fn login_form(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();

    if form.code.trim().is_empty() {
        return match state.auth.send_otp(email).await {
            Ok(()) => html_page(StatusCode::OK, state.pages.login(&LoginPage { email, code_sent: true, error: None })),
            Err(e) => login_failure(&state, email, false, e),
        };
    }

    match state.auth.verify_otp(email, &form.code).await {
        Ok(token) => {
            let jar = jar.add(session_cookie(token, state.config.cookie_secure));
            (jar, Redirect::to(pages::DASHBOARD_PATH)).into_response()
        }
        Err(e) => login_failure(&state, email, true, e),
    }
}

fn login_failure(state: &AppState, email: &str, code_sent: bool, err: OtpError) -> Response {
    let notice = otp_error_to_notice(err);
    html_page(notice.status, state.pages.login(&LoginPage { email, code_sent, error: Some(&notice.message) }))
}

/// `GET /admin/logout` — sign-out is POST only; a plain visit goes to login.
pub async fn logout_page() -> Redirect {
    Redirect::to(pages::LOGIN_PATH)
}

/// `POST /admin/logout` — sign out and return to the login page.
pub async fn logout_form(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = session_token(&jar) {
        if let Err(e) = state.auth.sign_out(token).await {
            tracing::error!(error = %e, "session delete failed");
        }
    }
    let jar = jar.add(cleared_session_cookie(state.config.cookie_secure));
    (jar, Redirect::to(pages::LOGIN_PATH)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
