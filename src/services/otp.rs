//! Admin one-time access codes.
//!
//! Creates and verifies short-lived six-character codes linked to an admin
//! email. Only the SHA-256 of a code is stored; delivery goes through a
//! [`CodeMailer`] so tests and local development never hit the email API.

use async_trait::async_trait;
use rand::Rng;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::session::bytes_to_hex;
use crate::rate_limit::RateLimitError;

pub(crate) const CODE_LEN: usize = 6;
pub(crate) const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_FAILED_ATTEMPTS: i32 = 5;
const OTP_EMAIL_TEMPLATE: &str = include_str!("../../templates/otp_email.html");

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("email is not an administrator")]
    NotAdmin,
    #[error("invalid code")]
    InvalidCode,
    #[error("expired or incorrect code")]
    VerificationFailed,
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.len() != CODE_LEN || !normalized.bytes().all(|c| CODE_ALPHABET.contains(&c)) {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn generate_access_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[must_use]
pub fn hash_access_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Replace any outstanding code for `email` with a fresh one and return it.
///
/// `email` must already be normalized.
pub async fn store_access_code(pool: &PgPool, email: &str) -> Result<String, OtpError> {
    sqlx::query("DELETE FROM admin_login_codes WHERE email = $1 AND consumed_at IS NULL")
        .bind(email)
        .execute(pool)
        .await?;

    let code = generate_access_code();
    sqlx::query("INSERT INTO admin_login_codes (email, code_hash) VALUES ($1, $2)")
        .bind(email)
        .bind(hash_access_code(&code))
        .execute(pool)
        .await?;

    Ok(code)
}

/// Consume the newest live code for `email` if `code` matches it.
///
/// A mismatch counts as a failed attempt; the code is burned after
/// `MAX_FAILED_ATTEMPTS` failures. Both arguments must already be normalized.
pub async fn consume_access_code(pool: &PgPool, email: &str, code: &str) -> Result<(), OtpError> {
    let consumed = sqlx::query(
        r"UPDATE admin_login_codes
          SET consumed_at = now()
          WHERE id = (
              SELECT id
              FROM admin_login_codes
              WHERE email = $1
                AND consumed_at IS NULL
                AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
          )
          AND code_hash = $2
          RETURNING id",
    )
    .bind(email)
    .bind(hash_access_code(code))
    .fetch_optional(pool)
    .await?;

    if consumed.is_some() {
        return Ok(());
    }

    sqlx::query(
        r"UPDATE admin_login_codes
          SET attempts = attempts + 1,
              consumed_at = CASE WHEN attempts + 1 >= $2 THEN now() ELSE consumed_at END
          WHERE id = (
              SELECT id
              FROM admin_login_codes
              WHERE email = $1
                AND consumed_at IS NULL
                AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
          )",
    )
    .bind(email)
    .bind(MAX_FAILED_ATTEMPTS)
    .execute(pool)
    .await?;

    Err(OtpError::VerificationFailed)
}

#[must_use]
pub fn render_otp_email(email: &str, code: &str) -> String {
    OTP_EMAIL_TEMPLATE
        .replace("{{EMAIL}}", &html_escape::encode_text(email))
        .replace("{{CODE}}", code)
}

// =============================================================================
// DELIVERY
// =============================================================================

/// Delivers access codes to admins.
#[async_trait]
pub trait CodeMailer: Send + Sync {
    async fn send_code(&self, to_email: &str, code: &str) -> Result<(), OtpError>;
}

/// Sends codes through the Resend API.
pub struct ResendMailer {
    client: Resend,
    from: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(api_key: &str, from: &str) -> Self {
        Self { client: Resend::new(api_key), from: from.to_owned() }
    }
}

#[async_trait]
impl CodeMailer for ResendMailer {
    async fn send_code(&self, to_email: &str, code: &str) -> Result<(), OtpError> {
        let html = render_otp_email(to_email, code);
        let email = CreateEmailBaseOptions::new(self.from.as_str(), [to_email], "Your admin sign-in code").with_html(&html);
        self.client
            .emails
            .send(email)
            .await
            .map_err(|e| OtpError::EmailDelivery(e.to_string()))?;
        Ok(())
    }
}

/// Development fallback: writes the code to the log instead of emailing it.
pub struct LogMailer;

#[async_trait]
impl CodeMailer for LogMailer {
    async fn send_code(&self, to_email: &str, code: &str) -> Result<(), OtpError> {
        tracing::warn!(email = %to_email, %code, "admin access code (email delivery disabled)");
        Ok(())
    }
}

#[cfg(test)]
#[path = "otp_test.rs"]
mod tests;
