mod config;
mod db;
mod entities;
mod error;
mod models;
mod pagination;
mod reconcile;
mod routes;
mod seed;
mod service;
mod store;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, service::MovieService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub movies: MovieService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,theater=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url, config.db_max_connections).await?;
    let movies = MovieService::new(db, format!("{}/movies/", config.api_prefix));

    if let Some(path) = &config.seed_csv {
        let report = seed::seed_from_path(&movies, path).await?;
        tracing::info!(
            path = %path.display(),
            inserted = report.inserted,
            skipped = report.skipped,
            "seed step complete"
        );
    }

    let state = Arc::new(AppState { config: config.clone(), movies });

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, prefix = %config.api_prefix, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
