use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(config)
        .await
        .expect("Failed to initialize application state");

    let analysis_service = web::Data::new(state.analysis_service.clone());
    let cache = web::Data::new(state.cache.clone());

    tracing::info!("Starting Rule-ATT&CK Mapper server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(analysis_service.clone())
            .app_data(cache.clone())
            .configure(api::analysis::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
            .configure(api::ui::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
