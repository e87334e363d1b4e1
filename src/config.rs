//! Site configuration parsed from environment variables.
//!
//! `.env` files are loaded by `main` through `dotenvy` before this runs, so
//! everything here reads plain process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::rate_limit::{DEFAULT_GLOBAL_LIMIT, DEFAULT_PER_EMAIL_LIMIT, DEFAULT_WINDOW_SECS, RateLimitConfig};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_WHATSAPP_NUMBER: &str = "254723153712";
pub const DEFAULT_RESEND_FROM: &str = "Little Kings & Queens <noreply@littlekingsqueens.co.ke>";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    /// Digits only, international format without `+`.
    pub whatsapp_number: String,
    /// Lowercased addresses allowed to sign in to the admin panel.
    pub admin_emails: Vec<String>,
    pub resend_api_key: Option<String>,
    pub resend_from: String,
    pub cookie_secure: bool,
    pub static_dir: PathBuf,
    pub otp_limits: RateLimitConfig,
}

impl SiteConfig {
    /// Build config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    /// - `ADMIN_EMAILS` (comma separated)
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `WHATSAPP_NUMBER`: default `254723153712`
    /// - `RESEND_API_KEY`: codes are logged instead of emailed when absent
    /// - `RESEND_FROM`
    /// - `COOKIE_SECURE`: `1|true|yes|on` / `0|false|no|off`, default false
    /// - `STATIC_DIR`: default `<crate>/static`
    /// - `OTP_RATE_LIMIT_PER_EMAIL`, `OTP_RATE_LIMIT_GLOBAL`,
    ///   `OTP_RATE_LIMIT_WINDOW_SECS`: default 3, 30, 600
    ///
    /// # Errors
    ///
    /// Returns an error if a required var is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SiteConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_positive(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let otp_limits = RateLimitConfig {
            per_email_limit: parse_positive(&lookup, "OTP_RATE_LIMIT_PER_EMAIL", DEFAULT_PER_EMAIL_LIMIT)?,
            global_limit: parse_positive(&lookup, "OTP_RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT)?,
            window: Duration::from_secs(parse_positive(&lookup, "OTP_RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS)?),
        };

        let whatsapp_number = match lookup("WHATSAPP_NUMBER") {
            Some(raw) => parse_whatsapp_number(&raw).ok_or(ConfigError::Invalid { var: "WHATSAPP_NUMBER", value: raw })?,
            None => DEFAULT_WHATSAPP_NUMBER.to_owned(),
        };

        let admin_emails = parse_admin_emails(lookup("ADMIN_EMAILS").as_deref());
        if admin_emails.is_empty() {
            return Err(ConfigError::Missing("ADMIN_EMAILS"));
        }

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            None => false,
        };

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"));

        Ok(Self {
            database_url,
            db_max_connections,
            port,
            whatsapp_number,
            admin_emails,
            resend_api_key: lookup("RESEND_API_KEY").filter(|v| !v.trim().is_empty()),
            resend_from: lookup("RESEND_FROM").unwrap_or_else(|| DEFAULT_RESEND_FROM.to_owned()),
            cookie_secure,
            static_dir,
            otp_limits,
        })
    }

    #[must_use]
    pub fn is_admin_email(&self, normalized_email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == normalized_email)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

/// Like [`parse_var`] but rejects zero.
fn parse_positive<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq + ToString,
{
    let value = parse_var(lookup, var, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid { var, value: value.to_string() });
    }
    Ok(value)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Accepts `+254 723 153 712`, `254-723-153712` and the like.
fn parse_whatsapp_number(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '+' | ' ' | '-'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

fn parse_admin_emails(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(crate::services::otp::normalize_email)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
