use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Process configuration, read once at startup from the environment
/// (after `dotenvy` has loaded any `.env` file).
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) database_path: PathBuf,
    pub(crate) jwt_secret: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = match env::var("PORT") {
            Ok(v) => v.parse().context("PORT is not a valid port number")?,
            Err(_) => 8000,
        };
        let database_path = match env::var("DATABASE_PATH") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_db_path()?,
        };
        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "expense-buddy-secret-key-2024".into());

        Ok(Self {
            host,
            port,
            database_path,
            jwt_secret,
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "expensebuddy", "ExpenseBuddy")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("expensebuddy.db"))
}
