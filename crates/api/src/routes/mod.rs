//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//!
//! # Auth
//! POST   /api/auth/register               - Create an account, returns a token
//! POST   /api/auth/login                  - Login, returns a token
//!
//! # Products
//! GET    /api/products                    - Paginated catalog listing
//! GET    /api/products/search?keyword=    - Keyword search
//! GET    /api/products/category/{name}    - Category listing
//! GET    /api/products/{id}               - Product detail
//! POST   /api/products                    - Add a product (catalog management)
//!
//! # Cart (bearer token required)
//! GET    /api/cart                        - Current cart
//! POST   /api/cart                        - Add item
//! PUT    /api/cart/{productId}            - Update line quantity
//! DELETE /api/cart/{productId}            - Remove line
//! DELETE /api/cart                        - Clear cart
//! ```

pub mod auth;
pub mod cart;
pub mod products;

use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode, Uri},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::middleware::{admission_middleware, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/search", get(products::search))
        .route("/category/{category}", get(products::by_category))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{productId}", axum::routing::put(cart::update).delete(cart::remove))
}

/// Build the full application router.
///
/// The generic admission tier wraps only the `/api` subtree, so health
/// probes are never throttled. Request-id, security headers, and CORS wrap
/// everything.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admission_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(cors_layer(state.config()))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Catch-all for unknown routes, in the standard response envelope.
async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "errors": [],
            "path": uri.path(),
        })),
    )
}

/// CORS layer from configuration: one allowed origin, or any if none is
/// configured.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config
        .allowed_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    }
}
