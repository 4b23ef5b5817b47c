use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Mount point of the movie routes, e.g. `/api/v1/theater`.
    pub api_prefix: String,
    pub seed_csv: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://theater.db?mode=rwc".to_string());

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .map(|s| s.parse().context("DB_MAX_CONNECTIONS"))
            .transpose()?
            .unwrap_or(5);

        let api_prefix = normalize_prefix(
            &std::env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1/theater".to_string()),
        );

        let seed_csv = std::env::var("SEED_CSV")
            .or_else(|_| std::env::var("PATH_TO_MOVIES_CSV"))
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            db_max_connections: db_max_connections.max(1),
            api_prefix,
            seed_csv,
        })
    }
}

/// Leading slash, no trailing slash; the root prefix becomes the empty string.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}
