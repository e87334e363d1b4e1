use super::*;
use crate::rate_limit::RateLimitError;

#[test]
fn credential_failures_share_one_message() {
    for err in [OtpError::InvalidEmail, OtpError::NotAdmin, OtpError::InvalidCode, OtpError::VerificationFailed] {
        let notice = otp_error_to_notice(err);
        assert_eq!(notice.status, StatusCode::UNAUTHORIZED);
        assert_eq!(notice.message, "Invalid email or code");
    }
}

#[test]
fn rate_limited_is_429() {
    let err = OtpError::RateLimited(RateLimitError::GlobalExceeded { limit: 30, window_secs: 600 });
    assert_eq!(otp_error_to_notice(err).status, StatusCode::TOO_MANY_REQUESTS);
}

#[test]
fn delivery_failure_is_bad_gateway() {
    let err = OtpError::EmailDelivery("smtp down".into());
    let notice = otp_error_to_notice(err);
    assert_eq!(notice.status, StatusCode::BAD_GATEWAY);
    assert!(!notice.message.contains("smtp"));
}

#[test]
fn database_failure_is_internal() {
    let notice = otp_error_to_notice(OtpError::Db(sqlx::Error::PoolTimedOut));
    assert_eq!(notice.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn session_token_ignores_empty_cookie() {
    let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
    assert_eq!(session_token(&jar), None);

    let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "abc"));
    assert_eq!(session_token(&jar), Some("abc"));
}

#[test]
fn session_cookie_is_http_only_and_scoped_to_root() {
    let cookie = session_cookie("tok".into(), true);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(Duration::days(SESSION_MAX_AGE_DAYS)));
}

#[test]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_session_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}
