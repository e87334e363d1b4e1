mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod site;
mod state;

use std::sync::Arc;

use services::otp::{CodeMailer, LogMailer, ResendMailer};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::SiteConfig::from_env().expect("invalid configuration");
    let port = config.port;

    let pool = db::init_pool(&config)
        .await
        .expect("database init failed");

    let mailer: Arc<dyn CodeMailer> = match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key, &config.resend_from)),
        None => {
            tracing::warn!("RESEND_API_KEY not set; admin sign-in codes will be logged");
            Arc::new(LogMailer)
        }
    };
    let pages = site::pages::Pages::new(&config.whatsapp_number).expect("page templates failed to parse");

    let state = state::AppState::new(pool, config, mailer, pages);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "kingsqueens listening");
    axum::serve(listener, app).await.expect("server failed");
}
