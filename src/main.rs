mod analytics;
mod api;
mod auth;
mod config;
mod db;
mod models;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("expensebuddy=info,tower_http=info")),
        )
        .init();

    let config = config::Config::from_env()?;
    let database = db::Database::open(&config.database_path)?;
    let tokens = auth::TokenService::new(&config.jwt_secret);
    let state = api::AppState::new(database, tokens);

    api::run_server(&config, state).await
}
