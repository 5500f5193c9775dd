// src/config.rs

use std::env;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the server runs on the
    /// in-memory store and forgets everything on shutdown.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: String,
    /// Origins allowed by CORS, comma separated in the environment.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url,
            port,
            rust_log,
            upload_dir,
            allowed_origins,
        }
    }
}
