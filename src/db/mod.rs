//! Postgres pool setup.
//!
//! `main` calls [`init_pool`] once before binding the listener; the schema in
//! `src/db/migrations` is brought up to date before any request is served.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::SiteConfig;

/// Connect with the configured pool size and apply pending migrations.
///
/// # Errors
///
/// Returns an error if Postgres is unreachable or a migration fails.
pub async fn init_pool(config: &SiteConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    tracing::info!(max_connections = config.db_max_connections, "database ready");

    Ok(pool)
}
