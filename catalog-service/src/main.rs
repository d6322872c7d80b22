mod config;
mod db;
mod handlers;
mod models;
mod services;
mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use mongodb::bson::doc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::store::CatalogStore;
use crate::services::ingest::ImageIngest;
use crate::storage::{github::GithubClient, staging::UploadStager};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub ingest: Arc<ImageIngest>,
}

/// Whole-request body cap; comfortably above the per-image limit.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting Catalog Service...");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    // Establish the database handle. The topology is lazy: an unreachable
    // server is logged here but does not halt startup; store operations
    // then fail per-request until the server comes back.
    let client = mongodb::Client::with_uri_str(&config.database.url).await?;
    let database = client.database(&config.database.name);
    match database.run_command(doc! { "ping": 1 }).await {
        Ok(_) => info!("Connected to MongoDB"),
        Err(err) => error!("Failed to connect to MongoDB: {}", err),
    }

    let store = Arc::new(CatalogStore::new(&database));

    // Scratch directory and remote image host
    let stager = UploadStager::new(&config.upload.dir)
        .map_err(|err| anyhow::anyhow!("failed to prepare upload directory: {}", err))?;
    let github = GithubClient::new(&config.github)
        .map_err(|err| anyhow::anyhow!("failed to build image host client: {}", err))?;
    let ingest = Arc::new(ImageIngest::new(stager, Arc::new(github)));
    info!("Image ingest pipeline initialized");

    let state = AppState { store, ingest };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/groups",
            post(handlers::groups::create_group).get(handlers::groups::list_groups),
        )
        .route(
            "/members",
            post(handlers::members::create_member).get(handlers::members::list_members),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Catalog Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
