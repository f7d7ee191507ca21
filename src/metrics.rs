// =============================================================================
// METRICS MODULE
// =============================================================================
// This module sets up Prometheus metrics for observability.
//
// LEARNING NOTES:
// - Prometheus uses a "pull" model - it scrapes the /metrics endpoint
// - Metrics have types: Counter, Gauge, Histogram
// - Labels add dimensions to metrics (e.g., endpoint="/api/v1/products")
// =============================================================================

use std::collections::HashMap;

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::models::Product;

// =============================================================================
// METRIC NAMES (Constants)
// =============================================================================
// Defined as constants to avoid typos, snake_case with unit suffixes per
// Prometheus naming conventions.

/// HTTP request counter
/// Labels: method (GET/POST), endpoint (/api/v1/products), status (200/409)
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// HTTP request duration histogram
/// Labels: method, endpoint
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Database query duration histogram
/// Labels: operation (select/insert/update/delete)
pub const DB_QUERY_DURATION_SECONDS: &str = "db_query_duration_seconds";

/// Catalog size gauge
/// Labels: category, active (true/false)
pub const CATALOG_PRODUCTS: &str = "catalog_products";

/// Catalog write attempts counter
/// Labels: operation (create/update/delete/toggle), status (success/failed)
pub const CATALOG_WRITES_TOTAL: &str = "catalog_writes_total";

/// SKU uniqueness conflicts counter
pub const CATALOG_SKU_CONFLICTS_TOTAL: &str = "catalog_sku_conflicts_total";

// =============================================================================
// SETUP FUNCTION
// =============================================================================
/// Initialize the Prometheus metrics recorder.
///
/// Installs the global recorder with latency buckets that make sense for
/// HTTP requests and returns the handle used to render /metrics.
pub fn setup_metrics() -> Result<PrometheusHandle> {
    // Latency buckets from 1ms (fast path) up to 10s (something is wrong)
    let latency_buckets = &[
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(DB_QUERY_DURATION_SECONDS.to_string()),
            latency_buckets,
        )?
        // Install as the global metrics recorder
        .install_recorder()?;

    // Descriptions appear in the /metrics output as HELP comments
    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests received"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request latency in seconds"
    );
    describe_histogram!(
        DB_QUERY_DURATION_SECONDS,
        "Database query latency in seconds"
    );
    describe_gauge!(
        CATALOG_PRODUCTS,
        "Number of products per category and active flag"
    );
    describe_counter!(
        CATALOG_WRITES_TOTAL,
        "Total number of catalog write attempts"
    );
    describe_counter!(
        CATALOG_SKU_CONFLICTS_TOTAL,
        "Total number of rejected duplicate-SKU writes"
    );

    Ok(handle)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================
// Convenience wrappers around the raw metrics macros with proper labels.

/// Record an HTTP request
///
/// # Arguments
/// * `method` - HTTP method (GET, POST, etc.)
/// * `endpoint` - Route template (/api/v1/products/:id)
/// * `status` - Response status code (200, 404, 409)
/// * `duration_secs` - Request duration in seconds
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(duration_secs);
}

/// Record database query duration
pub fn record_db_query(operation: &str, duration_secs: f64) {
    histogram!(
        DB_QUERY_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Record a catalog write attempt (create/update/delete/toggle)
pub fn record_write(operation: &str, status: &str) {
    counter!(
        CATALOG_WRITES_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a rejected duplicate-SKU write
pub fn record_sku_conflict() {
    counter!(CATALOG_SKU_CONFLICTS_TOTAL).increment(1);
}

/// Refresh the per-category product gauges from a full catalog listing
pub fn set_catalog_counts(products: &[Product]) {
    let mut counts: HashMap<(&'static str, bool), usize> = HashMap::new();
    for product in products {
        *counts.entry((product.category.as_str(), product.is_active)).or_default() += 1;
    }

    for ((category, active), count) in counts {
        gauge!(
            CATALOG_PRODUCTS,
            "category" => category,
            "active" => active.to_string()
        )
        .set(count as f64);
    }
}
