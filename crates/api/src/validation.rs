//! Declarative payload contracts.
//!
//! Every mutating entry point validates its payload here before any service
//! runs. Violations are collected exhaustively, one [`FieldError`] per
//! failing field, rather than stopping at the first problem. Successful
//! validation yields a typed value (normalized email, `u32` quantity), so
//! services never see raw payload fields.

use cartwheel_core::{Email, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FieldError;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Validated registration data.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemPayload {
    #[serde(rename = "productId")]
    pub product_id: Option<i32>,
    pub quantity: Option<i64>,
}

/// Cart line update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemPayload {
    pub quantity: Option<i64>,
}

/// Product creation request body.
#[derive(Debug, Deserialize)]
pub struct NewProductPayload {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub stock: Option<i64>,
}

/// Validate a registration payload.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_registration(
    payload: &RegisterPayload,
) -> Result<ValidRegistration, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = trimmed(&payload.name);
    match name.len() {
        0 => errors.push(FieldError::new("name", "Name is required")),
        1..=2 => errors.push(FieldError::new("name", "Name must be at least 3 characters")),
        3..=15 => {}
        _ => errors.push(FieldError::new("name", "Name cannot exceed 15 characters")),
    }

    let email = validate_email_field(&payload.email, &mut errors);

    let password = trimmed(&payload.password);
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    } else if !password_has_required_classes(&password) {
        errors.push(FieldError::new(
            "password",
            "Password must contain uppercase, lowercase, and numbers",
        ));
    }

    let phone = trimmed(&payload.phone);
    if phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone is required"));
    } else if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "phone",
            "Phone must be a valid 10-digit number",
        ));
    }

    let address = trimmed(&payload.address);
    match address.len() {
        0 => errors.push(FieldError::new("address", "Address is required")),
        1..=4 => errors.push(FieldError::new(
            "address",
            "Address must be at least 5 characters",
        )),
        5..=100 => {}
        _ => errors.push(FieldError::new(
            "address",
            "Address cannot exceed 100 characters",
        )),
    }

    match email {
        Some(email) if errors.is_empty() => Ok(ValidRegistration {
            name,
            email,
            password,
            phone,
            address,
        }),
        _ => Err(errors),
    }
}

/// Validate a login payload into a normalized email and password.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_login(payload: &LoginPayload) -> Result<(Email, String), Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = validate_email_field(&payload.email, &mut errors);

    let password = trimmed(&payload.password);
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }

    match email {
        Some(email) if errors.is_empty() => Ok((email, password)),
        _ => Err(errors),
    }
}

/// Validate an add-to-cart payload into a product ID and quantity.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_add_item(payload: &AddItemPayload) -> Result<(ProductId, u32), Vec<FieldError>> {
    let mut errors = Vec::new();

    if payload.product_id.is_none() {
        errors.push(FieldError::new("productId", "Product ID is required"));
    }

    let quantity = validate_quantity(payload.quantity, "Quantity must be greater than 0", &mut errors);

    match (payload.product_id, quantity) {
        (Some(id), Some(quantity)) if errors.is_empty() => Ok((ProductId::new(id), quantity)),
        _ => Err(errors),
    }
}

/// Validate a cart line update payload into a quantity.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_update_item(payload: &UpdateItemPayload) -> Result<u32, Vec<FieldError>> {
    let mut errors = Vec::new();
    let quantity = validate_quantity(payload.quantity, "Quantity must be at least 1", &mut errors);
    match quantity {
        Some(quantity) if errors.is_empty() => Ok(quantity),
        _ => Err(errors),
    }
}

/// Validate a product creation payload.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_new_product(
    payload: &NewProductPayload,
) -> Result<crate::models::NewProduct, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = trimmed(&payload.name);
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if !(3..=100).contains(&name.len()) {
        errors.push(FieldError::new("name", "Name must be 3 to 100 characters"));
    }

    match payload.price {
        None => errors.push(FieldError::new("price", "Price is required")),
        Some(price) if price <= Decimal::ZERO => errors.push(FieldError::new(
            "price",
            "Price must be a valid positive number",
        )),
        Some(_) => {}
    }

    let description = trimmed(&payload.description);
    if description.is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    } else if !(10..=1000).contains(&description.len()) {
        errors.push(FieldError::new(
            "description",
            "Description must be 10 to 1000 characters",
        ));
    }

    let category = trimmed(&payload.category);
    if category.is_empty() {
        errors.push(FieldError::new("category", "Category is required"));
    } else if !(2..=50).contains(&category.len()) {
        errors.push(FieldError::new(
            "category",
            "Category must be 2 to 50 characters",
        ));
    }

    let brand = trimmed(&payload.brand);
    if brand.is_empty() {
        errors.push(FieldError::new("brand", "Brand is required"));
    } else if !(2..=50).contains(&brand.len()) {
        errors.push(FieldError::new("brand", "Brand must be 2 to 50 characters"));
    }

    let stock = match payload.stock {
        None => {
            errors.push(FieldError::new("stock", "Stock is required"));
            None
        }
        Some(stock) => match u32::try_from(stock) {
            Ok(stock) => Some(stock),
            Err(_) => {
                errors.push(FieldError::new(
                    "stock",
                    "Stock must be a valid non-negative number",
                ));
                None
            }
        },
    };

    let images: Vec<String> = payload
        .images
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .collect();
    if images.is_empty() {
        errors.push(FieldError::new("images", "At least one image is required"));
    }

    match (payload.price, stock) {
        (Some(price), Some(stock)) if errors.is_empty() => Ok(crate::models::NewProduct {
            name,
            price,
            description,
            images,
            category,
            brand,
            stock,
        }),
        _ => Err(errors),
    }
}

fn trimmed(field: &Option<String>) -> String {
    field.as_deref().unwrap_or_default().trim().to_owned()
}

fn validate_email_field(field: &Option<String>, errors: &mut Vec<FieldError>) -> Option<Email> {
    let raw = trimmed(field);
    if raw.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
        return None;
    }
    match Email::parse(&raw) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.push(FieldError::new("email", "Invalid email format"));
            None
        }
    }
}

fn password_has_required_classes(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn validate_quantity(
    quantity: Option<i64>,
    too_small_message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    match quantity {
        None => {
            errors.push(FieldError::new("quantity", "Quantity is required"));
            None
        }
        Some(q) if q < 1 => {
            errors.push(FieldError::new("quantity", too_small_message));
            None
        }
        Some(q) => match u32::try_from(q) {
            Ok(q) => Some(q),
            Err(_) => {
                errors.push(FieldError::new(
                    "quantity",
                    "Quantity exceeds the allowed maximum",
                ));
                None
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_registration() -> RegisterPayload {
        RegisterPayload {
            name: Some("Jane Doe".to_owned()),
            email: Some("Jane@X.com ".to_owned()),
            password: Some("Passw0rd1".to_owned()),
            phone: Some("1234567890".to_owned()),
            address: Some("12 Main Street".to_owned()),
        }
    }

    #[test]
    fn test_registration_happy_path_normalizes_email() {
        let valid = validate_registration(&full_registration()).unwrap();
        assert_eq!(valid.email.as_str(), "jane@x.com");
        assert_eq!(valid.name, "Jane Doe");
    }

    #[test]
    fn test_registration_collects_all_failures() {
        let payload = RegisterPayload {
            name: Some("Jo".to_owned()),
            email: Some("not-an-email".to_owned()),
            password: Some("short".to_owned()),
            phone: Some("12345".to_owned()),
            address: Some("abc".to_owned()),
        };

        let errors = validate_registration(&payload).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "password", "phone", "address"]);
    }

    #[test]
    fn test_registration_missing_fields() {
        let payload = RegisterPayload {
            name: None,
            email: None,
            password: None,
            phone: None,
            address: None,
        };

        let errors = validate_registration(&payload).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().all(|e| e.message.contains("required")));
    }

    #[test]
    fn test_password_character_classes() {
        let mut payload = full_registration();
        payload.password = Some("alllowercase1".to_owned());
        let errors = validate_registration(&payload).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field, "password");

        payload.password = Some("NoDigitsHere".to_owned());
        assert!(validate_registration(&payload).is_err());

        payload.password = Some("Passw0rd1".to_owned());
        assert!(validate_registration(&payload).is_ok());
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        let mut payload = full_registration();
        for bad in ["123456789", "12345678901", "12345abcde"] {
            payload.phone = Some(bad.to_owned());
            let errors = validate_registration(&payload).unwrap_err();
            assert_eq!(errors.first().unwrap().field, "phone");
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = validate_login(&LoginPayload {
            email: None,
            password: None,
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_add_item_quantity_bounds() {
        for bad in [0, -3] {
            let errors = validate_add_item(&AddItemPayload {
                product_id: Some(1),
                quantity: Some(bad),
            })
            .unwrap_err();
            assert_eq!(errors.first().unwrap().message, "Quantity must be greater than 0");
        }

        let (id, quantity) = validate_add_item(&AddItemPayload {
            product_id: Some(1),
            quantity: Some(2),
        })
        .unwrap();
        assert_eq!(id, ProductId::new(1));
        assert_eq!(quantity, 2);
    }

    #[test]
    fn test_add_item_requires_product_and_quantity() {
        let errors = validate_add_item(&AddItemPayload {
            product_id: None,
            quantity: None,
        })
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["productId", "quantity"]);
    }

    #[test]
    fn test_update_item_rejects_zero() {
        let errors = validate_update_item(&UpdateItemPayload { quantity: Some(0) }).unwrap_err();
        assert_eq!(errors.first().unwrap().message, "Quantity must be at least 1");
    }

    #[test]
    fn test_new_product_contract() {
        let payload = NewProductPayload {
            name: Some("Hammer".to_owned()),
            price: Some(Decimal::from(25)),
            description: Some("A sturdy claw hammer".to_owned()),
            images: Some(vec!["https://img.example/h.jpg".to_owned()]),
            category: Some("tools".to_owned()),
            brand: Some("Acme".to_owned()),
            stock: Some(5),
        };
        let new = validate_new_product(&payload).unwrap();
        assert_eq!(new.stock, 5);

        let empty = NewProductPayload {
            name: None,
            price: None,
            description: None,
            images: None,
            category: None,
            brand: None,
            stock: None,
        };
        let errors = validate_new_product(&empty).unwrap_err();
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_new_product_rejects_bad_numbers() {
        let payload = NewProductPayload {
            name: Some("Hammer".to_owned()),
            price: Some(Decimal::ZERO),
            description: Some("A sturdy claw hammer".to_owned()),
            images: Some(vec![String::new()]),
            category: Some("tools".to_owned()),
            brand: Some("Acme".to_owned()),
            stock: Some(-1),
        };
        let errors = validate_new_product(&payload).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["price", "stock", "images"]);
    }
}
