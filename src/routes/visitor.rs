//! Anonymous visitor identity.
//!
//! Likes and reviews are attributed to a per-browser id kept in the
//! `user_session_id` cookie. The extractor reuses a well-formed cookie or
//! mints a fresh id; handlers pass their jar through [`Visitor::attach`] so a
//! fresh id is persisted with the response.

use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::FromRef;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use time::Duration;

use crate::state::AppState;

pub const VISITOR_COOKIE: &str = "user_session_id";
const ID_PREFIX: &str = "anon_";
const SUFFIX_LEN: usize = 13;
const MAX_ID_LEN: usize = 64;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub struct Visitor {
    pub id: String,
    minted: bool,
    secure: bool,
}

/// `anon_<unix-millis>_<13 base36 chars>`
#[must_use]
pub fn generate_visitor_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{ID_PREFIX}{millis}_{suffix}")
}

#[must_use]
pub fn is_valid_visitor_id(raw: &str) -> bool {
    raw.len() <= MAX_ID_LEN
        && raw
            .strip_prefix(ID_PREFIX)
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'))
}

impl Visitor {
    /// Add the visitor cookie to `jar` if the id was minted for this request.
    #[must_use]
    pub fn attach(&self, jar: CookieJar) -> CookieJar {
        if !self.minted {
            return jar;
        }
        let cookie = Cookie::build((VISITOR_COOKIE, self.id.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::days(365));
        jar.add(cookie)
    }
}

impl<S> axum::extract::FromRequestParts<S> for Visitor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secure = AppState::from_ref(state).config.cookie_secure;
        let jar = CookieJar::from_headers(&parts.headers);
        let existing = jar
            .get(VISITOR_COOKIE)
            .map(Cookie::value)
            .filter(|v| is_valid_visitor_id(v));

        Ok(match existing {
            Some(id) => Self { id: id.to_owned(), minted: false, secure },
            None => Self { id: generate_visitor_id(), minted: true, secure },
        })
    }
}
