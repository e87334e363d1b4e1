//! Admin auth provider and per-request auth state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Sign-in is email OTP only. `AuthProvider` is shared through `AppState`;
//! each request asks it to `restore` an [`AuthState`] from the session
//! cookie, and the page guard and admin extractor consult that state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::rate_limit::RateLimiter;
use crate::services::otp::{self, CodeMailer, OtpError};
use crate::services::session::{self, AdminSession};

/// Who is looking at the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The session store could not be read yet.
    Loading,
    Unauthenticated,
    Authenticated(AdminSession),
}

impl AuthState {
    #[must_use]
    pub fn session(&self) -> Option<&AdminSession> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Loading | Self::Unauthenticated => None,
        }
    }
}

#[derive(Clone)]
pub struct AuthProvider {
    pool: PgPool,
    config: Arc<SiteConfig>,
    mailer: Arc<dyn CodeMailer>,
    limiter: RateLimiter,
}

impl AuthProvider {
    #[must_use]
    pub fn new(pool: PgPool, config: Arc<SiteConfig>, mailer: Arc<dyn CodeMailer>, limiter: RateLimiter) -> Self {
        Self { pool, config, mailer, limiter }
    }

    fn admin_email(&self, email: &str) -> Result<String, OtpError> {
        let normalized = otp::normalize_email(email).ok_or(OtpError::InvalidEmail)?;
        if !self.config.is_admin_email(&normalized) {
            return Err(OtpError::NotAdmin);
        }
        Ok(normalized)
    }

    /// Email a fresh access code to an allowlisted admin.
    ///
    /// # Errors
    ///
    /// Rejects unknown or malformed emails before touching the database, and
    /// rate limits per email and globally.
    pub async fn send_otp(&self, email: &str) -> Result<(), OtpError> {
        let email = self.admin_email(email)?;
        self.limiter.check_and_record(&email)?;

        let code = otp::store_access_code(&self.pool, &email).await?;
        self.mailer.send_code(&email, &code).await?;
        tracing::info!(%email, "admin access code sent");
        Ok(())
    }

    /// Check an access code and open a session. Returns the session token.
    ///
    /// # Errors
    ///
    /// Returns `VerificationFailed` for wrong, expired, or burned codes.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<String, OtpError> {
        let email = self.admin_email(email)?;
        let code = otp::normalize_code(code).ok_or(OtpError::InvalidCode)?;

        otp::consume_access_code(&self.pool, &email, &code).await?;
        let token = session::create_session(&self.pool, &email).await?;
        tracing::info!(%email, "admin signed in");
        Ok(token)
    }

    /// End the session behind `token`.
    ///
    /// # Errors
    ///
    /// Returns a database error if the delete fails.
    pub async fn sign_out(&self, token: &str) -> Result<(), sqlx::Error> {
        session::delete_session(&self.pool, token).await
    }

    /// Resolve the auth state for a request carrying `token`.
    ///
    /// A store failure yields `Loading` rather than `Unauthenticated` so a
    /// database hiccup never looks like a sign-out.
    pub async fn restore(&self, token: Option<&str>) -> AuthState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return AuthState::Unauthenticated;
        };
        match session::validate_session(&self.pool, token).await {
            Ok(Some(session)) => AuthState::Authenticated(session),
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                AuthState::Loading
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
