//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool, the parsed config, the site route table, the
//! parsed page templates, and the admin auth provider. Nothing in it is mutated per request; navigation
//! and auth state are built fresh for every request.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::rate_limit::RateLimiter;
use crate::services::otp::CodeMailer;
use crate::site::auth::AuthProvider;
use crate::site::pages::{self, Pages, View};
use crate::site::router::RouteTable;

/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<SiteConfig>,
    pub site_routes: Arc<RouteTable<View>>,
    pub pages: Arc<Pages>,
    pub auth: AuthProvider,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: SiteConfig, mailer: Arc<dyn CodeMailer>, pages: Pages) -> Self {
        let limiter = RateLimiter::new(config.otp_limits);
        let config = Arc::new(config);
        let auth = AuthProvider::new(pool.clone(), config.clone(), mailer, limiter);
        Self { pool, config, site_routes: Arc::new(pages::site_routes()), pages: Arc::new(pages), auth }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
