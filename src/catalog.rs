// =============================================================================
// CATALOG SERVICE MODULE
// =============================================================================
// Orchestrates the product lifecycle: validation, SKU uniqueness checks and
// store operations. HTTP concerns (status codes, extractors, metrics) stay in
// handlers.rs; this layer only knows about payloads, products and AppError.
//
// The service is constructed once at startup with an injected Database handle
// (no module-level singletons) and cloned into the shared application state.
//
// Product state machine: nonexistent -> active <-> inactive -> deleted.
// active/inactive are just the is_active flag; deleted is a hard delete and
// terminal.
// =============================================================================

use uuid::Uuid;

use crate::db::{is_unique_violation, Database, NewProduct, ProductChanges};
use crate::error::{AppError, AppResult};
use crate::models::{Category, Product, ProductFilters, ProductPayload};
use crate::validation::{validate_payload, Mode};

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Create the service over an already-connected store handle
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // -------------------------------------------------------------------------
    // READ PATHS
    // -------------------------------------------------------------------------

    /// List products matching the filters, newest first.
    /// An empty result is not an error.
    pub async fn list(&self, filters: &ProductFilters) -> AppResult<Vec<Product>> {
        Ok(self.db.list_products(filters).await?)
    }

    /// Fetch a single product by id
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        self.db
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No product with id {}", id)))
    }

    // -------------------------------------------------------------------------
    // WRITE PATHS
    // -------------------------------------------------------------------------

    /// Create a new product.
    ///
    /// Runs full validation (all violations reported at once), normalizes the
    /// SKU to uppercase, applies defaults (quantity 0, active true) and checks
    /// SKU uniqueness before inserting. The pre-check is only a fast path for
    /// a friendly message: two concurrent creates can both pass it, and the
    /// loser of the race gets its unique violation converted to the same
    /// Conflict error.
    pub async fn create(&self, payload: ProductPayload) -> AppResult<Product> {
        let errors = validate_payload(&payload, Mode::Create);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let new_product = to_new_product(&payload)?;

        // Fast-path uniqueness check
        if self.db.find_by_sku(&new_product.sku, None).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "SKU \"{}\" already exists",
                new_product.sku
            )));
        }

        tracing::info!(sku = %new_product.sku, name = %new_product.name, "Creating product");

        match self.db.insert_product(&new_product).await {
            Ok(product) => Ok(product),
            // Lost the check-then-insert race; the store's UNIQUE constraint
            // is the authoritative guard
            Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                "SKU \"{}\" already exists",
                new_product.sku
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a full or partial update to a product.
    ///
    /// Only supplied fields are validated and written. A SKU change re-runs
    /// the uniqueness check excluding this record; id and created_at are
    /// never modified, updated_at is always refreshed.
    pub async fn update(&self, id: Uuid, payload: ProductPayload) -> AppResult<Product> {
        let errors = validate_payload(&payload, Mode::Update);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let changes = to_changes(&payload)?;

        if let Some(sku) = &changes.sku {
            if self.db.find_by_sku(sku, Some(id)).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "SKU \"{}\" already exists on another product",
                    sku
                )));
            }
        }

        match self.db.update_product(id, &changes).await {
            Ok(Some(product)) => {
                tracing::info!(id = %id, "Product updated");
                Ok(product)
            }
            Ok(None) => Err(AppError::NotFound(format!("No product with id {}", id))),
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::Conflict("SKU already exists on another product".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Hard-delete a product and return the removed record
    pub async fn delete(&self, id: Uuid) -> AppResult<Product> {
        let removed = self
            .db
            .delete_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No product with id {}", id)))?;

        tracing::info!(id = %id, sku = %removed.sku, "Product deleted");
        Ok(removed)
    }

    /// Flip the active flag: a convenience wrapper over update
    pub async fn toggle_active(&self, id: Uuid, current_is_active: bool) -> AppResult<Product> {
        let payload = ProductPayload {
            is_active: Some(!current_is_active),
            ..ProductPayload::default()
        };
        self.update(id, payload).await
    }
}

// =============================================================================
// PAYLOAD CONVERSION
// =============================================================================
// Pure helpers turning a validated payload into adapter input. Both run after
// validation, so the error arms only fire if a caller skips it; they map to
// Internal rather than panic.

/// Build the insert row from a create payload: trims strings, uppercases the
/// SKU and fills the documented defaults (quantity 0, active true).
fn to_new_product(payload: &ProductPayload) -> AppResult<NewProduct> {
    let sku = required(&payload.sku, "sku")?.trim().to_uppercase();
    let name = required(&payload.name, "name")?.trim().to_string();
    let brand = required(&payload.brand, "brand")?.trim().to_string();
    let category = parse_category(required(&payload.category, "category")?)?;
    let price = payload
        .price
        .ok_or_else(|| AppError::Internal("price missing after validation".to_string()))?;

    Ok(NewProduct {
        sku,
        name,
        brand,
        category,
        quantity: payload.quantity.unwrap_or(0.0) as i32,
        price,
        is_active: payload.is_active.unwrap_or(true),
        image_url: required(&payload.image_url, "imageUrl")?.trim().to_string(),
    })
}

/// Build the partial change set from an update payload; absent fields stay
/// untouched in the store.
fn to_changes(payload: &ProductPayload) -> AppResult<ProductChanges> {
    let category = match &payload.category {
        Some(raw) => Some(parse_category(raw)?),
        None => None,
    };

    Ok(ProductChanges {
        sku: payload.sku.as_deref().map(|s| s.trim().to_uppercase()),
        name: payload.name.as_deref().map(|s| s.trim().to_string()),
        brand: payload.brand.as_deref().map(|s| s.trim().to_string()),
        category,
        quantity: payload.quantity.map(|q| q as i32),
        price: payload.price,
        is_active: payload.is_active,
        image_url: payload.image_url.as_deref().map(|s| s.trim().to_string()),
    })
}

fn required<'a>(field: &'a Option<String>, name: &str) -> AppResult<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| AppError::Internal(format!("{} missing after validation", name)))
}

fn parse_category(raw: &str) -> AppResult<Category> {
    Category::try_from(raw.to_string()).map_err(|e| AppError::Internal(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn create_payload() -> ProductPayload {
        ProductPayload {
            sku: Some("lap-01".to_string()),
            name: Some("  ThinkPad X1  ".to_string()),
            brand: Some("Lenovo".to_string()),
            category: Some("laptops".to_string()),
            quantity: None,
            price: Some(999.0),
            is_active: None,
            image_url: Some("https://cdn.example.com/x1.png".to_string()),
        }
    }

    #[test]
    fn test_new_product_uppercases_sku() {
        let product = to_new_product(&create_payload()).unwrap();
        assert_eq!(product.sku, "LAP-01");
    }

    #[test]
    fn test_new_product_applies_defaults() {
        let product = to_new_product(&create_payload()).unwrap();
        assert_eq!(product.quantity, 0, "quantity defaults to 0");
        assert!(product.is_active, "isActive defaults to true");
    }

    #[test]
    fn test_new_product_trims_strings() {
        let product = to_new_product(&create_payload()).unwrap();
        assert_eq!(product.name, "ThinkPad X1");
    }

    #[test]
    fn test_new_product_keeps_explicit_values() {
        let mut payload = create_payload();
        payload.quantity = Some(5.0);
        payload.is_active = Some(false);

        let product = to_new_product(&payload).unwrap();
        assert_eq!(product.quantity, 5);
        assert!(!product.is_active);
    }

    #[test]
    fn test_changes_only_carry_supplied_fields() {
        let payload = ProductPayload {
            price: Some(49.9),
            ..ProductPayload::default()
        };

        let changes = to_changes(&payload).unwrap();
        assert_eq!(changes.price, Some(49.9));
        assert!(changes.sku.is_none());
        assert!(changes.name.is_none());
        assert!(changes.is_active.is_none());
    }

    #[test]
    fn test_changes_uppercase_sku() {
        let payload = ProductPayload {
            sku: Some("lap-02".to_string()),
            ..ProductPayload::default()
        };

        let changes = to_changes(&payload).unwrap();
        assert_eq!(changes.sku.as_deref(), Some("LAP-02"));
    }

    #[test]
    fn test_changes_parse_category() {
        let payload = ProductPayload {
            category: Some("monitors".to_string()),
            ..ProductPayload::default()
        };

        let changes = to_changes(&payload).unwrap();
        assert_eq!(changes.category, Some(Category::Monitors));
    }
}
