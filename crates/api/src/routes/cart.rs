//! Cart route handlers.
//!
//! All routes require a bearer token; every operation is scoped to the
//! authenticated user's own cart. Responses carry the full updated cart so
//! clients never have to re-fetch after a mutation.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use cartwheel_core::ProductId;
use rust_decimal::Decimal;

use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::services::CartService;
use crate::state::AppState;
use crate::validation::{
    AddItemPayload, UpdateItemPayload, validate_add_item, validate_update_item,
};

/// Cart line as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineBody {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
    pub total_price: Decimal,
}

/// Cart as returned to clients.
///
/// `total_items` is the number of lines, not the summed quantity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBody {
    pub items: Vec<CartLineBody>,
    pub total_items: u32,
    pub total_price: Decimal,
}

impl CartBody {
    /// The shape reported when the user has no persisted cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_price: Decimal::ZERO,
        }
    }
}

impl From<&Cart> for CartBody {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| CartLineBody {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.unit_price,
                    total_price: item.line_total,
                })
                .collect(),
            total_items: cart.total_items,
            total_price: cart.total_price,
        }
    }
}

fn cart_response(message: &str, cart: Option<&Cart>) -> Json<serde_json::Value> {
    let body = cart.map_or_else(CartBody::empty, CartBody::from);
    Json(json!({
        "success": true,
        "message": message,
        "cart": body,
    }))
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<i32>()
        .map(ProductId::new)
        .map_err(|_| ApiError::MalformedIdentifier)
}

/// Handle `GET /api/cart`.
///
/// A user with no cart gets the empty-cart shape, not an error; reading
/// never creates anything.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let service = CartService::new(state.products(), state.carts());
    let cart = service.get_cart(user.id).await;
    Ok(cart_response("Cart fetched successfully", cart.as_ref()))
}

/// Handle `POST /api/cart`.
#[instrument(skip(state, user, payload))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<AddItemPayload>,
) -> Result<impl IntoResponse> {
    let (product_id, quantity) = validate_add_item(&payload).map_err(ApiError::Validation)?;

    let service = CartService::new(state.products(), state.carts());
    let cart = service.add_item(user.id, product_id, quantity).await?;

    Ok(cart_response(
        "Product added to cart successfully",
        Some(&cart),
    ))
}

/// Handle `PUT /api/cart/{productId}`.
#[instrument(skip(state, user, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse> {
    let product_id = parse_product_id(&product_id)?;
    let quantity = validate_update_item(&payload).map_err(ApiError::Validation)?;

    let service = CartService::new(state.products(), state.carts());
    let cart = service.update_item(user.id, product_id, quantity).await?;

    Ok(cart_response("Cart updated successfully", Some(&cart)))
}

/// Handle `DELETE /api/cart/{productId}`.
///
/// Removing a product that is not in the cart succeeds and changes nothing.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse> {
    let product_id = parse_product_id(&product_id)?;

    let service = CartService::new(state.products(), state.carts());
    let cart = service.remove_item(user.id, product_id).await;

    Ok(cart_response("Product removed from cart", cart.as_ref()))
}

/// Handle `DELETE /api/cart`. Idempotent.
#[instrument(skip(state, user))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let service = CartService::new(state.products(), state.carts());
    let cart = service.clear_cart(user.id).await;

    Ok(cart_response("Cart cleared successfully", cart.as_ref()))
}
