// src/main.rs

use formbuilder::config::Config;
use formbuilder::routes;
use formbuilder::state::AppState;
use formbuilder::store::{FormStore, MemoryStore, PgStore, ResponseStore};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Pick the storage backend
    let (forms, responses): (Arc<dyn FormStore>, Arc<dyn ResponseStore>) =
        match &config.database_url {
            Some(database_url) => {
                // Initialize Database Pool with Retry
                let mut retry_count = 0;
                let pool = loop {
                    match PgPoolOptions::new()
                        .max_connections(5)
                        .acquire_timeout(Duration::from_secs(3))
                        .connect(database_url)
                        .await
                    {
                        Ok(pool) => break pool,
                        Err(e) => {
                            retry_count += 1;
                            if retry_count > 5 {
                                panic!("Failed to connect to database after 5 retries: {}", e);
                            }
                            tracing::warn!(
                                "Database not ready, retrying in 2s... (Attempt {})",
                                retry_count
                            );
                            tokio::time::sleep(Duration::from_secs(2)).await;
                        }
                    }
                };

                tracing::info!("Database connected...");

                // Run Migrations Automatically
                tracing::info!("Running migrations...");
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .expect("Failed to run database migrations");
                tracing::info!("Migrations applied successfully.");

                let store = Arc::new(PgStore::new(pool));
                (store.clone() as Arc<dyn FormStore>, store as Arc<dyn ResponseStore>)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory store, data is not persisted");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn FormStore>, store as Arc<dyn ResponseStore>)
            }
        };

    // Create AppState
    let state = AppState {
        forms,
        responses,
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server (connect info feeds submission metadata and the
    // rate limiter key)
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
