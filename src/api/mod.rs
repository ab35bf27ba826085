mod dto;
mod error;
mod extract;
mod routes;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::config::Config;
use crate::db::Database;

use error::{ApiError, ApiResult};

#[derive(Clone)]
pub(crate) struct AppState {
    db: Arc<Mutex<Database>>,
    tokens: Arc<TokenService>,
}

impl AppState {
    pub(crate) fn new(db: Database, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            tokens: Arc::new(tokens),
        }
    }

    /// Lock the shared database handle for one handler's unit of queries.
    fn db(&self) -> ApiResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("Database lock poisoned")))
    }
}

pub(crate) fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/categories", get(routes::categories::list_categories))
        .route(
            "/api/expenses",
            post(routes::expenses::create_expense).get(routes::expenses::list_expenses),
        )
        .route(
            "/api/expenses/:id",
            put(routes::expenses::update_expense).delete(routes::expenses::delete_expense),
        )
        .route(
            "/api/budgets",
            post(routes::budgets::create_budget).get(routes::budgets::list_budgets),
        )
        .route(
            "/api/budgets/:id",
            put(routes::budgets::update_budget).delete(routes::budgets::delete_budget),
        )
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        .route("/api/health", get(routes::health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub(crate) async fn run_server(config: &Config, state: AppState) -> Result<()> {
    let router = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("ExpenseBuddy API listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
