//! Path-to-view routing for site pages.
//!
//! DESIGN
//! ======
//! A `RouteTable` is built once at startup and shared. Each request gets its
//! own `Navigator`, which owns the current path and is the only thing that
//! changes it. Resolution rules:
//! - an exact pattern match always wins;
//! - otherwise the longest prefix-mode pattern that matches on a `/`
//!   boundary wins (`/admin` covers `/admin/x`, never `/administrator`);
//! - equal-length ties go to the earlier registration;
//! - no match resolves to nothing.

use std::sync::Arc;

use super::auth::AuthState;
use super::guard::{Guard, GuardDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Prefix,
}

#[derive(Debug, Clone)]
pub struct Route<V> {
    pattern: String,
    mode: MatchMode,
    view: V,
    guard: Option<Guard>,
}

impl<V> Route<V> {
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    #[must_use]
    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    fn matches_prefix(&self, path: &str) -> bool {
        if self.mode != MatchMode::Prefix {
            return false;
        }
        if self.pattern == "/" {
            return true;
        }
        path.strip_prefix(self.pattern.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable<V> {
    routes: Vec<Route<V>>,
}

impl<V> Default for RouteTable<V> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<V> RouteTable<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exact(self, pattern: &str, view: V) -> Self {
        self.register(pattern, MatchMode::Exact, view)
    }

    #[must_use]
    pub fn prefix(self, pattern: &str, view: V) -> Self {
        self.register(pattern, MatchMode::Prefix, view)
    }

    /// Protect the most recently registered route.
    #[must_use]
    pub fn guarded(mut self, login_path: &str) -> Self {
        if let Some(last) = self.routes.last_mut() {
            last.guard = Some(Guard::new(login_path));
        }
        self
    }

    fn register(mut self, pattern: &str, mode: MatchMode, view: V) -> Self {
        self.routes.push(Route { pattern: normalize_path(pattern), mode, view, guard: None });
        self
    }

    /// Resolve an already-normalized path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Route<V>> {
        if let Some(exact) = self.routes.iter().find(|r| r.pattern == path) {
            return Some(exact);
        }
        self.routes
            .iter()
            .filter(|r| r.matches_prefix(path))
            .fold(None, |best: Option<&Route<V>>, r| match best {
                Some(b) if b.pattern.len() >= r.pattern.len() => Some(b),
                _ => Some(r),
            })
    }
}

/// Strip query and fragment, ensure a leading `/`, drop trailing slashes.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_owned();
    }
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// What the page layer should do for a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<V> {
    Render(V),
    Placeholder,
    Redirect(String),
    NotFound,
}

/// Per-request navigation context.
pub struct Navigator<V> {
    table: Arc<RouteTable<V>>,
    current: String,
}

impl<V: Clone> Navigator<V> {
    #[must_use]
    pub fn new(table: Arc<RouteTable<V>>) -> Self {
        Self { table, current: "/".to_owned() }
    }

    #[must_use]
    pub fn current_path(&self) -> &str {
        &self.current
    }

    /// Set the current path and resolve it.
    pub fn navigate(&mut self, path: &str) -> Option<&Route<V>> {
        self.current = normalize_path(path);
        self.table.resolve(&self.current)
    }

    /// Navigate and apply the matched route's guard.
    ///
    /// On a guard redirect the navigator moves to the login path, so
    /// `current_path` reflects where the visitor ends up.
    pub fn render(&mut self, path: &str, auth: &AuthState) -> Outcome<V> {
        let Some(route) = self.navigate(path) else {
            return Outcome::NotFound;
        };
        tracing::debug!(pattern = route.pattern(), "route matched");
        let view = route.view().clone();
        let decision = route.guard().map_or(GuardDecision::Render, |g| g.check(auth));

        match decision {
            GuardDecision::Render => Outcome::Render(view),
            GuardDecision::Placeholder => Outcome::Placeholder,
            GuardDecision::Redirect(target) => {
                if normalize_path(&target) == self.current {
                    tracing::warn!(path = %self.current, "guard redirects to itself; refusing to loop");
                    return Outcome::NotFound;
                }
                self.navigate(&target);
                Outcome::Redirect(target)
            }
        }
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
