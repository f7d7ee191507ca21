// =============================================================================
// VALIDATION MODULE
// =============================================================================
// Pure, side-effect-free validation of candidate product payloads.
//
// The validator never touches the database. It checks each field that is
// present in the payload independently and collects ALL violations into a
// field -> message map, so a client fixing a form sees every problem at once
// instead of one per round trip.
//
// Two modes:
// - Create: required fields must be present (quantity and isActive have
//   defaults and may be omitted)
// - Update: only the fields that were supplied are validated
// =============================================================================

use std::collections::BTreeMap;

use url::Url;

use crate::models::{Category, ProductPayload};

/// Validation mode: full (create) or partial (update)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// All required fields must be present
    Create,
    /// Only supplied fields are validated
    Update,
}

/// Minimum length for SKU and product name
const MIN_LENGTH: usize = 3;

/// Map of field name to human-readable violation message.
/// An empty map means the payload is valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

// -----------------------------------------------------------------------------
// ENTRY POINT
// -----------------------------------------------------------------------------
/// Validate a candidate product payload.
///
/// # Arguments
/// * `payload` - The candidate fields (all optional at this stage)
/// * `mode` - Create (require all mandatory fields) or Update (partial)
///
/// # Returns
/// An empty map when the payload is valid, otherwise one message per
/// offending field.
pub fn validate_payload(payload: &ProductPayload, mode: Mode) -> FieldErrors {
    let mut errors = FieldErrors::new();

    validate_sku(payload.sku.as_deref(), mode, &mut errors);
    validate_name(payload.name.as_deref(), mode, &mut errors);
    validate_brand(payload.brand.as_deref(), mode, &mut errors);
    validate_category(payload.category.as_deref(), mode, &mut errors);
    validate_quantity(payload.quantity, &mut errors);
    validate_price(payload.price, mode, &mut errors);
    validate_image_url(payload.image_url.as_deref(), mode, &mut errors);

    errors
}

// -----------------------------------------------------------------------------
// PER-FIELD RULES
// -----------------------------------------------------------------------------

fn validate_sku(sku: Option<&str>, mode: Mode, errors: &mut FieldErrors) {
    match sku {
        None => {
            if mode == Mode::Create {
                errors.insert("sku", "SKU is required".to_string());
            }
        }
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                errors.insert("sku", "SKU is required".to_string());
            } else if trimmed.len() < MIN_LENGTH {
                errors.insert("sku", "SKU must be at least 3 characters".to_string());
            } else if !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                errors.insert(
                    "sku",
                    "SKU may only contain letters, numbers and hyphens".to_string(),
                );
            }
        }
    }
}

fn validate_name(name: Option<&str>, mode: Mode, errors: &mut FieldErrors) {
    match name {
        None => {
            if mode == Mode::Create {
                errors.insert("name", "Name is required".to_string());
            }
        }
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                errors.insert("name", "Name is required".to_string());
            } else if trimmed.len() < MIN_LENGTH {
                errors.insert("name", "Name must be at least 3 characters".to_string());
            }
        }
    }
}

fn validate_brand(brand: Option<&str>, mode: Mode, errors: &mut FieldErrors) {
    match brand {
        None => {
            if mode == Mode::Create {
                errors.insert("brand", "Brand is required".to_string());
            }
        }
        Some(value) => {
            if value.trim().is_empty() {
                errors.insert("brand", "Brand is required".to_string());
            }
        }
    }
}

fn validate_category(category: Option<&str>, mode: Mode, errors: &mut FieldErrors) {
    match category {
        None => {
            if mode == Mode::Create {
                errors.insert("category", "Category is required".to_string());
            }
        }
        Some(value) => {
            if Category::try_from(value.to_string()).is_err() {
                errors.insert(
                    "category",
                    format!("'{}' is not a valid category", value),
                );
            }
        }
    }
}

// Quantity is optional in both modes (it defaults to 0 on create), but when
// supplied it must be a non-negative whole number. The payload carries it as
// f64 so that 3.5 reaches this check instead of failing deserialization.
fn validate_quantity(quantity: Option<f64>, errors: &mut FieldErrors) {
    if let Some(value) = quantity {
        if !value.is_finite() || value.fract() != 0.0 {
            errors.insert("quantity", "Quantity must be a whole number".to_string());
        } else if value < 0.0 {
            errors.insert("quantity", "Quantity cannot be negative".to_string());
        } else if value > i32::MAX as f64 {
            errors.insert("quantity", "Quantity is too large".to_string());
        }
    }
}

fn validate_price(price: Option<f64>, mode: Mode, errors: &mut FieldErrors) {
    match price {
        None => {
            if mode == Mode::Create {
                errors.insert("price", "Price is required".to_string());
            }
        }
        Some(value) => {
            if !value.is_finite() {
                errors.insert("price", "Price must be a valid number".to_string());
            } else if value <= 0.0 {
                errors.insert("price", "Price must be greater than 0".to_string());
            }
        }
    }
}

fn validate_image_url(image_url: Option<&str>, mode: Mode, errors: &mut FieldErrors) {
    match image_url {
        None => {
            if mode == Mode::Create {
                errors.insert("imageUrl", "Image URL is required".to_string());
            }
        }
        Some(value) => {
            if value.trim().is_empty() {
                errors.insert("imageUrl", "Image URL is required".to_string());
            } else if Url::parse(value.trim()).is_err() {
                errors.insert("imageUrl", "Image URL is not a valid URL".to_string());
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// A payload that passes create-mode validation
    fn valid_payload() -> ProductPayload {
        ProductPayload {
            sku: Some("lap-01".to_string()),
            name: Some("ThinkPad X1".to_string()),
            brand: Some("Lenovo".to_string()),
            category: Some("laptops".to_string()),
            quantity: Some(5.0),
            price: Some(999.0),
            is_active: None,
            image_url: Some("https://cdn.example.com/x1.png".to_string()),
        }
    }

    #[test]
    fn test_valid_create_payload_has_no_errors() {
        let errors = validate_payload(&valid_payload(), Mode::Create);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_create_reports_all_missing_fields_at_once() {
        let errors = validate_payload(&ProductPayload::default(), Mode::Create);

        // Every required field is reported together, not just the first
        for field in ["sku", "name", "brand", "category", "price", "imageUrl"] {
            assert!(errors.contains_key(field), "missing error for {}", field);
        }
        // quantity and isActive have defaults and are not required
        assert!(!errors.contains_key("quantity"));
    }

    #[test]
    fn test_update_ignores_absent_fields() {
        let payload = ProductPayload {
            price: Some(49.9),
            ..ProductPayload::default()
        };

        let errors = validate_payload(&payload, Mode::Update);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut payload = valid_payload();
        payload.price = Some(-5.0);

        let errors = validate_payload(&payload, Mode::Create);
        assert_eq!(
            errors.get("price").map(String::as_str),
            Some("Price must be greater than 0")
        );
    }

    #[test]
    fn test_zero_price_is_rejected() {
        let mut payload = valid_payload();
        payload.price = Some(0.0);

        let errors = validate_payload(&payload, Mode::Create);
        assert!(errors.contains_key("price"));
    }

    #[test]
    fn test_nan_price_is_rejected() {
        let mut payload = valid_payload();
        payload.price = Some(f64::NAN);

        let errors = validate_payload(&payload, Mode::Create);
        assert_eq!(
            errors.get("price").map(String::as_str),
            Some("Price must be a valid number")
        );
    }

    #[test]
    fn test_fractional_quantity_is_rejected() {
        let mut payload = valid_payload();
        payload.quantity = Some(3.5);

        let errors = validate_payload(&payload, Mode::Create);
        assert_eq!(
            errors.get("quantity").map(String::as_str),
            Some("Quantity must be a whole number")
        );
    }

    #[test]
    fn test_negative_quantity_is_rejected_in_both_modes() {
        let payload = ProductPayload {
            quantity: Some(-1.0),
            ..ProductPayload::default()
        };

        assert!(validate_payload(&payload, Mode::Update).contains_key("quantity"));

        let mut create = valid_payload();
        create.quantity = Some(-1.0);
        assert!(validate_payload(&create, Mode::Create).contains_key("quantity"));
    }

    #[test]
    fn test_sku_rules() {
        // Too short
        let payload = ProductPayload {
            sku: Some("ab".to_string()),
            ..ProductPayload::default()
        };
        assert_eq!(
            validate_payload(&payload, Mode::Update)
                .get("sku")
                .map(String::as_str),
            Some("SKU must be at least 3 characters")
        );

        // Illegal characters
        let payload = ProductPayload {
            sku: Some("lap_01!".to_string()),
            ..ProductPayload::default()
        };
        assert_eq!(
            validate_payload(&payload, Mode::Update)
                .get("sku")
                .map(String::as_str),
            Some("SKU may only contain letters, numbers and hyphens")
        );

        // Whitespace only counts as missing
        let payload = ProductPayload {
            sku: Some("   ".to_string()),
            ..ProductPayload::default()
        };
        assert_eq!(
            validate_payload(&payload, Mode::Update)
                .get("sku")
                .map(String::as_str),
            Some("SKU is required")
        );

        // Mixed case with hyphen and digits is fine
        let payload = ProductPayload {
            sku: Some("Lap-01".to_string()),
            ..ProductPayload::default()
        };
        assert!(validate_payload(&payload, Mode::Update).is_empty());
    }

    #[test]
    fn test_short_name_is_rejected() {
        let payload = ProductPayload {
            name: Some("X1".to_string()),
            ..ProductPayload::default()
        };
        assert!(validate_payload(&payload, Mode::Update).contains_key("name"));
    }

    #[test]
    fn test_invalid_category_is_rejected() {
        let payload = ProductPayload {
            category: Some("furniture".to_string()),
            ..ProductPayload::default()
        };
        assert_eq!(
            validate_payload(&payload, Mode::Update)
                .get("category")
                .map(String::as_str),
            Some("'furniture' is not a valid category")
        );
    }

    #[test]
    fn test_malformed_image_url_is_rejected() {
        let payload = ProductPayload {
            image_url: Some("not a url".to_string()),
            ..ProductPayload::default()
        };
        assert_eq!(
            validate_payload(&payload, Mode::Update)
                .get("imageUrl")
                .map(String::as_str),
            Some("Image URL is not a valid URL")
        );
    }

    #[test]
    fn test_multiple_violations_reported_together() {
        let payload = ProductPayload {
            sku: Some("x".to_string()),
            name: Some("ok name".to_string()),
            brand: Some("".to_string()),
            category: Some("furniture".to_string()),
            quantity: Some(3.5),
            price: Some(-5.0),
            is_active: None,
            image_url: Some("nope".to_string()),
        };

        let errors = validate_payload(&payload, Mode::Create);
        assert_eq!(errors.len(), 6);
    }
}
