// =============================================================================
// HANDLERS MODULE
// =============================================================================
// This module contains all HTTP request handlers (controller layer).
//
// LEARNING NOTES:
// - Handlers are async functions that receive requests and return responses
// - Axum uses "extractors" to parse request data (path params, JSON body, etc.)
// - State is shared via the State<T> extractor
//
// AXUM EXTRACTORS EXPLAINED:
// - State<T>: Access shared application state
// - Path<T>: Extract path parameters (/products/:id -> id)
// - Query<T>: Extract query parameters (?category=laptops)
// - Json<T>: Parse JSON request body
//
// Product ids arrive as raw strings and are parsed here so that a malformed
// id produces a categorized 400 instead of axum's default rejection.
// =============================================================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::*;
use crate::{auth, AppState};

// =============================================================================
// HEALTH CHECK ENDPOINTS
// =============================================================================
// These endpoints are used by orchestrators (Kubernetes, Docker) to determine
// if the service is running and ready to receive traffic.

/// Liveness probe - Is the service running?
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    // Simply return OK - if we can respond, we're alive
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "catalog-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe - Is the service ready to handle requests?
///
/// Checks that the database is accessible. If this fails, the orchestrator
/// won't send traffic to this instance.
///
/// GET /ready
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    let db_healthy = state.db.health_check().await;

    let response = ReadinessResponse {
        status: if db_healthy { "ready" } else { "not_ready" }.to_string(),
        checks: ReadinessChecks {
            database: db_healthy,
        },
    };

    if db_healthy {
        Ok(Json(response))
    } else {
        // Return 503 Service Unavailable if not ready
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

// =============================================================================
// METRICS ENDPOINT
// =============================================================================
/// Prometheus metrics endpoint
///
/// Returns all metrics in Prometheus text format for scraping.
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

// =============================================================================
// PRODUCT API ENDPOINTS
// =============================================================================

/// Parse a path segment into a product id.
/// A malformed id is a client error, reported before any store access.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::MalformedInput(format!("'{}' is not a valid product id", raw)))
}

// -----------------------------------------------------------------------------
// LIST PRODUCTS
// -----------------------------------------------------------------------------
/// List products with optional filters
///
/// GET /api/v1/products
/// GET /api/v1/products?category=laptops&brand=len&isActive=false
///
/// # Query Parameters
/// - `category`: exact category match
/// - `brand`: case-insensitive substring match
/// - `isActive`: exact flag match (absent means both)
///
/// # Response
/// ```json
/// { "success": true, "data": [...], "total": 3 }
/// ```
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<Json<ProductListResponse>> {
    let start = Instant::now();

    tracing::debug!(?filters, "Listing products");

    let products = state.catalog.list(&filters).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/products", 200, duration);
    metrics::record_db_query("select", duration);

    // Refresh the per-category gauges from an unfiltered listing
    if filters.is_empty() {
        metrics::set_catalog_counts(&products);
    }

    Ok(Json(ProductListResponse::new(products)))
}

// -----------------------------------------------------------------------------
// GET SINGLE PRODUCT
// -----------------------------------------------------------------------------
/// Get a single product by id
///
/// GET /api/v1/products/:id
///
/// # Response
/// - 200 OK: product found
/// - 400 Bad Request: malformed id
/// - 404 Not Found: no product at that id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let start = Instant::now();

    let id = parse_id(&id)?;
    let product = state.catalog.get(id).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/api/v1/products/:id", 200, duration);
    metrics::record_db_query("select", duration);

    Ok(Json(ProductResponse::new(product)))
}

// -----------------------------------------------------------------------------
// CREATE PRODUCT
// -----------------------------------------------------------------------------
/// Create a new product
///
/// POST /api/v1/products
///
/// # Request Body
/// ```json
/// {
///   "sku": "lap-01",
///   "name": "ThinkPad X1",
///   "brand": "Lenovo",
///   "category": "laptops",
///   "price": 999,
///   "quantity": 5,
///   "imageUrl": "https://cdn.example.com/x1.png"
/// }
/// ```
///
/// # Response
/// - 201 Created: product stored, SKU uppercased, id assigned
/// - 400 Bad Request: validation errors (all fields reported)
/// - 409 Conflict: SKU already exists
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProductPayload>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let start = Instant::now();

    let result = state.catalog.create(payload).await;
    let duration = start.elapsed().as_secs_f64();

    match result {
        Ok(product) => {
            metrics::record_http_request("POST", "/api/v1/products", 201, duration);
            metrics::record_write("create", "success");

            tracing::info!(id = %product.id, sku = %product.sku, "Product created");

            Ok((
                StatusCode::CREATED,
                Json(ProductResponse::with_message(product, "Product created")),
            ))
        }
        Err(err) => {
            let status = err.status().as_u16();
            metrics::record_http_request("POST", "/api/v1/products", status, duration);
            metrics::record_write("create", "failed");
            if matches!(err, AppError::Conflict(_)) {
                metrics::record_sku_conflict();
            }
            Err(err)
        }
    }
}

// -----------------------------------------------------------------------------
// UPDATE PRODUCT (PUT and PATCH)
// -----------------------------------------------------------------------------
/// Update a product, fully or partially
///
/// PUT   /api/v1/products/:id
/// PATCH /api/v1/products/:id
///
/// Both verbs share the same semantics: only the supplied fields are
/// validated and written. A SKU change is checked for uniqueness against
/// every other product.
///
/// # Response
/// - 200 OK: updated product
/// - 400 Bad Request: malformed id or validation errors
/// - 404 Not Found: no product at that id
/// - 409 Conflict: new SKU already belongs to another product
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> AppResult<Json<ProductResponse>> {
    let start = Instant::now();

    let id = parse_id(&id)?;
    let result = state.catalog.update(id, payload).await;
    let duration = start.elapsed().as_secs_f64();

    match result {
        Ok(product) => {
            metrics::record_http_request("PUT", "/api/v1/products/:id", 200, duration);
            metrics::record_write("update", "success");

            Ok(Json(ProductResponse::with_message(
                product,
                "Product updated",
            )))
        }
        Err(err) => {
            let status = err.status().as_u16();
            metrics::record_http_request("PUT", "/api/v1/products/:id", status, duration);
            metrics::record_write("update", "failed");
            if matches!(err, AppError::Conflict(_)) {
                metrics::record_sku_conflict();
            }
            Err(err)
        }
    }
}

// -----------------------------------------------------------------------------
// DELETE PRODUCT
// -----------------------------------------------------------------------------
/// Delete a product (hard delete, no resurrection)
///
/// DELETE /api/v1/products/:id
///
/// # Response
/// - 200 OK: the removed product, echoed for confirmation
/// - 400 Bad Request: malformed id
/// - 404 Not Found: no product at that id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let start = Instant::now();

    let id = parse_id(&id)?;
    let removed = state.catalog.delete(id).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("DELETE", "/api/v1/products/:id", 200, duration);
    metrics::record_write("delete", "success");

    Ok(Json(ProductResponse::with_message(
        removed,
        "Product deleted",
    )))
}

// -----------------------------------------------------------------------------
// TOGGLE ACTIVE FLAG
// -----------------------------------------------------------------------------
/// Flip a product's active flag
///
/// PATCH /api/v1/products/:id/toggle
///
/// # Request Body
/// ```json
/// { "currentIsActive": true }
/// ```
///
/// The caller reports the flag it is looking at and the service writes the
/// opposite, equivalent to PATCH with {"isActive": !currentIsActive}.
pub async fn toggle_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> AppResult<Json<ProductResponse>> {
    let start = Instant::now();

    let id = parse_id(&id)?;
    let product = state
        .catalog
        .toggle_active(id, request.current_is_active)
        .await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("PATCH", "/api/v1/products/:id/toggle", 200, duration);
    metrics::record_write("toggle", "success");

    let message = if product.is_active {
        "Product activated"
    } else {
        "Product deactivated"
    };
    Ok(Json(ProductResponse::with_message(product, message)))
}

// =============================================================================
// AUTH ENDPOINTS
// =============================================================================

/// Register a new user account
///
/// POST /api/v1/auth/register
///
/// The password is stored as an Argon2 hash, never as plaintext.
///
/// # Response
/// - 201 Created: account created (hash not included)
/// - 400 Bad Request: missing/short fields or unknown role
/// - 409 Conflict: email already registered
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = request.email.trim().to_lowercase();

    if request.name.trim().is_empty() {
        return Err(AppError::MalformedInput("Name is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::MalformedInput(
            "A valid email is required".to_string(),
        ));
    }
    if request.password.len() < auth::MIN_PASSWORD_LENGTH {
        return Err(AppError::MalformedInput(format!(
            "Password must be at least {} characters",
            auth::MIN_PASSWORD_LENGTH
        )));
    }

    let role = match request.role.as_deref() {
        None => "employee",
        Some("admin") => "admin",
        Some("employee") => "employee",
        Some(other) => {
            return Err(AppError::MalformedInput(format!(
                "'{}' is not a valid role",
                other
            )))
        }
    };

    let password_hash = auth::hash_password(&request.password)?;

    let user = match state
        .db
        .insert_user(request.name.trim(), &email, &password_hash, role)
        .await
    {
        Ok(user) => user,
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(AppError::Conflict("Email already registered".to_string()))
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(email = %user.email, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            data: user.into(),
            message: Some("Account created".to_string()),
        }),
    ))
}

/// Verify a credential pair
///
/// POST /api/v1/auth/login
///
/// Unknown email and wrong password produce the same 401 message, so this
/// endpoint cannot be used to probe which emails exist.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = request.email.trim().to_lowercase();

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&user.password_hash, &request.password)? {
        return Err(invalid());
    }

    tracing::info!(email = %user.email, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        data: user.into(),
        message: None,
    }))
}
