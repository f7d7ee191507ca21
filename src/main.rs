// =============================================================================
// CATALOG SERVICE - Main Entry Point
// =============================================================================
// This is the main entry point for the Rust-based Product Catalog Service.
//
// WHAT THIS SERVICE DOES:
// - Manages the product catalog (CRUD by id, filtered listing)
// - Enforces SKU uniqueness through the database UNIQUE constraint
// - Validates payloads field by field before any store access
// - Verifies user credentials with salted Argon2 hashes
// - Exposes Prometheus metrics for observability
// =============================================================================

// -----------------------------------------------------------------------------
// MODULE DECLARATIONS
// -----------------------------------------------------------------------------
mod auth; // Password hashing/verification (auth.rs)
mod catalog; // Product lifecycle orchestration (catalog.rs)
mod config; // Configuration loading (config.rs)
mod db; // Database operations (db.rs)
mod error; // Error types (error.rs)
mod handlers; // HTTP request handlers (handlers.rs)
mod metrics; // Prometheus metrics setup (metrics.rs)
mod models; // Data structures (models.rs)
mod validation; // Payload validation (validation.rs)

use axum::{
    routing::{get, patch, post},
    Router,
};

// Arc (Atomic Reference Counting) allows safe sharing across async tasks
use std::sync::Arc;

// Tower-HTTP provides common HTTP middleware
use tower_http::{
    cors::{Any, CorsLayer}, // CORS handling
    trace::TraceLayer,      // Request tracing/logging
};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::db::Database;
use crate::metrics::setup_metrics;

// -----------------------------------------------------------------------------
// APPLICATION STATE
// -----------------------------------------------------------------------------
// Shared state available to all request handlers. The database pool and the
// catalog service over it are created exactly once at startup and injected
// here; there are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    // Database connection pool wrapper (also used directly for auth/user ops)
    pub db: Database,

    // Product lifecycle service over the same pool
    pub catalog: CatalogService,

    // Prometheus metrics handle, used to render the /metrics endpoint
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

// -----------------------------------------------------------------------------
// MAIN FUNCTION
// -----------------------------------------------------------------------------
// The #[tokio::main] attribute transforms this into an async main function.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -------------------------------------------------------------------------
    // STEP 1: Load environment variables
    // -------------------------------------------------------------------------
    // dotenvy loads variables from .env file into the environment
    dotenvy::dotenv().ok(); // .ok() ignores errors (file might not exist)

    // -------------------------------------------------------------------------
    // STEP 2: Initialize logging/tracing
    // -------------------------------------------------------------------------
    // Structured JSON logging; RUST_LOG controls log levels
    // Example: RUST_LOG=info,catalog_service=debug
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Catalog Service...");

    // -------------------------------------------------------------------------
    // STEP 3: Load configuration
    // -------------------------------------------------------------------------
    let config = Config::from_env()?;
    info!(port = config.port, "Configuration loaded");

    // -------------------------------------------------------------------------
    // STEP 4: Set up Prometheus metrics
    // -------------------------------------------------------------------------
    let metrics_handle = setup_metrics()?;
    info!("Prometheus metrics initialized");

    // -------------------------------------------------------------------------
    // STEP 5: Connect to PostgreSQL database
    // -------------------------------------------------------------------------
    // The pool is created once here and shared by every request for the
    // lifetime of the process.
    let db = Database::connect(&config.database_url).await?;
    info!("Connected to PostgreSQL");

    // Run database migrations (create tables if they don't exist)
    db.run_migrations().await?;
    info!("Database migrations completed");

    // -------------------------------------------------------------------------
    // STEP 6: Create application state
    // -------------------------------------------------------------------------
    let catalog = CatalogService::new(db.clone());
    let state = Arc::new(AppState {
        db,
        catalog,
        metrics_handle,
    });

    // -------------------------------------------------------------------------
    // STEP 7: Define routes
    // -------------------------------------------------------------------------
    // Router maps URL paths to handler functions. An unsupported method on a
    // known path gets axum's 405 with an Allow header listing the supported
    // methods.
    let app = Router::new()
        // ----- Health & Readiness Endpoints -----
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        // ----- Metrics Endpoint -----
        .route("/metrics", get(handlers::metrics_handler))
        // ----- Product Catalog API -----
        .route(
            "/api/v1/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/v1/products/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/api/v1/products/:id/toggle", patch(handlers::toggle_product))
        // ----- Auth API -----
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/login", post(handlers::login))
        // ----- Middleware Layers -----
        // CORS layer: the dashboard frontend calls this API cross-origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any) // Configure for production!
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Trace layer: log every request
        .layer(TraceLayer::new_for_http())
        // Share application state with all handlers
        .with_state(state);

    // -------------------------------------------------------------------------
    // STEP 8: Start the HTTP server
    // -------------------------------------------------------------------------
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, "Catalog Service is listening");

    // Runs until the process is terminated
    axum::serve(listener, app).await?;

    Ok(())
}
