//! Admin session management.
//!
//! A verified access code yields a long-lived random token stored in
//! `admin_sessions`. The browser keeps it in an HttpOnly cookie so the admin
//! stays signed in across reloads until the row expires or is deleted.

use std::fmt::Write;

use rand::Rng;
use serde::Serialize;
use sqlx::{PgPool, Row};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Signed-in administrator, as resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    pub email: String,
    /// RFC 3339 UTC timestamp.
    pub expires_at: String,
}

/// Create a session for the given admin email, returning the token.
pub async fn create_session(pool: &PgPool, email: &str) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO admin_sessions (token, email) VALUES ($1, $2)")
        .bind(&token)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Validate a session token and return the associated admin.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<AdminSession>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT email,
                  to_char(expires_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS expires_at
           FROM admin_sessions
           WHERE token = $1 AND expires_at > now()"#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| AdminSession { email: r.get("email"), expires_at: r.get("expires_at") }))
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM admin_sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
