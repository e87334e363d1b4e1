//! Protected-route guard.
//!
//! `Loading → Placeholder`, `Unauthenticated → Redirect(login)`,
//! `Authenticated → Render`. The redirect is declarative: the HTTP layer
//! turns it into a `303 See Other`, it never renders protected content first.

use super::auth::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    login_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Placeholder,
    Render,
    Redirect(String),
}

impl Guard {
    #[must_use]
    pub fn new(login_path: &str) -> Self {
        Self { login_path: login_path.to_owned() }
    }

    #[must_use]
    pub fn check(&self, auth: &AuthState) -> GuardDecision {
        match auth {
            AuthState::Loading => GuardDecision::Placeholder,
            AuthState::Unauthenticated => GuardDecision::Redirect(self.login_path.clone()),
            AuthState::Authenticated(_) => GuardDecision::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::AdminSession;

    fn signed_in() -> AuthState {
        AuthState::Authenticated(AdminSession { email: "owner@example.com".into(), expires_at: String::new() })
    }

    #[test]
    fn loading_shows_placeholder() {
        assert_eq!(Guard::new("/admin/login").check(&AuthState::Loading), GuardDecision::Placeholder);
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        assert_eq!(
            Guard::new("/admin/login").check(&AuthState::Unauthenticated),
            GuardDecision::Redirect("/admin/login".into())
        );
    }

    #[test]
    fn authenticated_renders() {
        assert_eq!(Guard::new("/admin/login").check(&signed_in()), GuardDecision::Render);
    }
}
