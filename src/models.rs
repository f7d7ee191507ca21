// =============================================================================
// MODELS MODULE
// =============================================================================
// This module defines the data structures used throughout the service.
//
// LEARNING NOTES:
// - Rust uses structs to define data structures
// - Derive macros automatically implement common traits
// - Serde handles JSON serialization/deserialization
//
// The wire format is camelCase (isActive, imageUrl, createdAt) to match the
// JSON contract the dashboard frontend consumes.
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// PRODUCT CATEGORY
// =============================================================================
// The category is a closed enumeration. Anything outside these four values is
// rejected by validation before it ever reaches the database, and the table
// carries a CHECK constraint as a second line of defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Laptops,
    Monitors,
    Peripherals,
    Accessories,
}

/// Error returned when a string is not one of the four known categories
#[derive(Debug, Error)]
#[error("'{0}' is not a valid category")]
pub struct CategoryParseError(pub String);

impl Category {
    /// All valid categories, in display order
    pub const ALL: [Category; 4] = [
        Category::Laptops,
        Category::Monitors,
        Category::Peripherals,
        Category::Accessories,
    ];

    /// Lowercase name as stored in the database and sent over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Laptops => "laptops",
            Category::Monitors => "monitors",
            Category::Peripherals => "peripherals",
            Category::Accessories => "accessories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// TryFrom<String> is what SQLx uses to decode the category column back into
// the enum (see the #[sqlx(try_from = "String")] attribute on Product).
impl TryFrom<String> for Category {
    type Error = CategoryParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "laptops" => Ok(Category::Laptops),
            "monitors" => Ok(Category::Monitors),
            "peripherals" => Ok(Category::Peripherals),
            "accessories" => Ok(Category::Accessories),
            _ => Err(CategoryParseError(value)),
        }
    }
}

// =============================================================================
// PRODUCT
// =============================================================================
// Represents a single product record in the catalog.
//
// DERIVE MACROS EXPLAINED:
// - Debug: Allows printing with {:?} for debugging
// - Clone: Allows creating copies of the struct
// - Serialize: Converts struct to JSON (for API responses)
// - Deserialize: Converts JSON to struct (for tests and clients)
// - FromRow: Allows SQLx to map database rows to this struct
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier for the product record
    /// Assigned by the database at creation and never changed
    pub id: Uuid,

    /// Stock Keeping Unit - the unique business identifier
    /// Normalized to uppercase on every write ("lap-01" is stored as "LAP-01")
    pub sku: String,

    /// Human-readable product name
    pub name: String,

    /// Manufacturer or brand name
    pub brand: String,

    /// One of the four fixed categories
    #[sqlx(try_from = "String")]
    pub category: Category,

    /// Units in stock, never negative
    pub quantity: i32,

    /// Unit price, strictly positive
    pub price: f64,

    /// Whether the product is visible in the active catalog
    pub is_active: bool,

    /// Product image location, validated as a well-formed URL
    pub image_url: String,

    /// When this record was created (set once)
    pub created_at: DateTime<Utc>,

    /// When this record was last updated (refreshed on every mutation)
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// API REQUEST/RESPONSE STRUCTURES
// =============================================================================
// These structs define the shape of API requests and responses.
// Separating these from the database model lets the API accept partial or
// malformed input and report field-level problems instead of a bare 422.

// -----------------------------------------------------------------------------
// PRODUCT PAYLOAD
// -----------------------------------------------------------------------------
/// Candidate product fields for create and update requests.
///
/// Every field is optional at the deserialization stage so that the validator
/// can report all missing/invalid fields together. `quantity` and `price`
/// arrive as f64 on purpose: a JSON `3.5` for quantity must produce a
/// field-level "must be an integer" message, not a deserialization failure.
///
/// # Example JSON
/// ```json
/// {
///   "sku": "lap-01",
///   "name": "ThinkPad X1",
///   "brand": "Lenovo",
///   "category": "laptops",
///   "price": 999.0,
///   "quantity": 5,
///   "imageUrl": "https://cdn.example.com/x1.png"
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    /// Raw category string, checked against the enumeration by the validator
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
}

// -----------------------------------------------------------------------------
// QUERY FILTERS
// -----------------------------------------------------------------------------
/// Optional filters for the list endpoint.
///
/// # Example
/// GET /api/v1/products?category=laptops&brand=len&isActive=false
///
/// Absence of a field is distinct from an explicit value: `isActive=false`
/// filters for inactive products, while leaving it off returns both.
/// An unknown category value is not an error; it simply matches nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    /// Exact category match
    pub category: Option<String>,

    /// Case-insensitive substring match on brand
    pub brand: Option<String>,

    /// Exact active-flag match
    pub is_active: Option<bool>,
}

impl ProductFilters {
    /// True when no filter field is set (the query selects everything)
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.brand.is_none() && self.is_active.is_none()
    }
}

// -----------------------------------------------------------------------------
// TOGGLE REQUEST
// -----------------------------------------------------------------------------
/// Request body for the active-flag toggle endpoint.
/// The caller reports the flag it is looking at; the service flips it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub current_is_active: bool,
}

// -----------------------------------------------------------------------------
// PRODUCT RESPONSES
// -----------------------------------------------------------------------------
/// Response envelope for a single product
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    /// Always true on the success path
    pub success: bool,

    /// The product record
    pub data: Product,

    /// Optional human-readable confirmation ("Product created")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProductResponse {
    pub fn new(data: Product) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: Product, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Response envelope for the list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub success: bool,

    /// Matching products, most recently created first
    pub data: Vec<Product>,

    /// Number of matches (no pagination, so this equals data.len())
    pub total: usize,
}

impl ProductListResponse {
    pub fn new(data: Vec<Product>) -> Self {
        let total = data.len();
        Self {
            success: true,
            data,
            total,
        }
    }
}

// =============================================================================
// USERS & AUTHENTICATION
// =============================================================================

/// A user account as stored in the database.
/// The password is only ever stored as an Argon2 hash (PHC string).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /api/v1/auth/register
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// "admin" or "employee"; defaults to "employee" when omitted
    pub role: Option<String>,
}

/// Request body for POST /api/v1/auth/login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User fields safe to return to clients (no password hash)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Response envelope for the auth endpoints
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub data: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// HEALTH CHECK RESPONSES
// =============================================================================
// Standard health check response structures

/// Simple health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Detailed readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

/// Individual dependency health checks
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: bool,
}

// =============================================================================
// ERROR RESPONSES
// =============================================================================
// Standardized error response format for the API.
// Every failure carries success=false, a machine-readable error code and a
// human-readable message; validation failures additionally carry the full
// field -> violation map.

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false on the error path
    pub success: bool,

    /// Error type/code (NOT_FOUND, VALIDATION_ERROR, ...)
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field-level violations, present only for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<&'static str, String>>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            errors: None,
        }
    }

    /// Create a validation error response carrying the field map
    pub fn with_fields(
        error: impl Into<String>,
        message: impl Into<String>,
        errors: BTreeMap<&'static str, String>,
    ) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            errors: Some(errors),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in Category::ALL {
            let parsed = Category::try_from(category.as_str().to_string())
                .expect("known category should parse");
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_category_rejects_unknown() {
        let err = Category::try_from("furniture".to_string()).unwrap_err();
        assert!(err.to_string().contains("furniture"));
    }

    #[test]
    fn test_category_serde_is_lowercase() {
        let json = serde_json::to_string(&Category::Laptops).unwrap();
        assert_eq!(json, "\"laptops\"");

        let parsed: Category = serde_json::from_str("\"monitors\"").unwrap();
        assert_eq!(parsed, Category::Monitors);
    }

    #[test]
    fn test_payload_accepts_camel_case_fields() {
        let payload: ProductPayload = serde_json::from_str(
            r#"{
                "sku": "lap-01",
                "name": "ThinkPad X1",
                "brand": "Lenovo",
                "category": "laptops",
                "price": 999.0,
                "quantity": 5,
                "isActive": false,
                "imageUrl": "https://cdn.example.com/x1.png"
            }"#,
        )
        .unwrap();

        assert_eq!(payload.sku.as_deref(), Some("lap-01"));
        assert_eq!(payload.is_active, Some(false));
        assert_eq!(
            payload.image_url.as_deref(),
            Some("https://cdn.example.com/x1.png")
        );
    }

    #[test]
    fn test_payload_fractional_quantity_still_deserializes() {
        // Deserialization must not reject 3.5 outright; the validator turns it
        // into a field-level "must be an integer" message.
        let payload: ProductPayload = serde_json::from_str(r#"{"quantity": 3.5}"#).unwrap();
        assert_eq!(payload.quantity, Some(3.5));
    }

    #[test]
    fn test_filters_distinguish_absent_from_false() {
        let absent: ProductFilters = serde_json::from_str("{}").unwrap();
        assert!(absent.is_active.is_none());
        assert!(absent.is_empty());

        let explicit: ProductFilters = serde_json::from_str(r#"{"isActive": false}"#).unwrap();
        assert_eq!(explicit.is_active, Some(false));
        assert!(!explicit.is_empty());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product {
            id: Uuid::nil(),
            sku: "LAP-01".to_string(),
            name: "ThinkPad X1".to_string(),
            brand: "Lenovo".to_string(),
            category: Category::Laptops,
            quantity: 5,
            price: 999.0,
            is_active: true,
            image_url: "https://cdn.example.com/x1.png".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["isActive"], serde_json::json!(true));
        assert_eq!(
            json["imageUrl"],
            serde_json::json!("https://cdn.example.com/x1.png")
        );
        assert_eq!(json["category"], serde_json::json!("laptops"));
        assert!(json.get("createdAt").is_some());
    }
}
