//! Product route handlers.
//!
//! The read paths are pure lookups over the product store; only creation
//! mutates, guarded by the catalog admission tier. Binary image upload is
//! not part of this service; products are created with image URLs.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use cartwheel_core::ProductId;

use crate::error::{ApiError, Result};
use crate::middleware::ClientIp;
use crate::models::Product;
use crate::state::AppState;
use crate::validation::{NewProductPayload, validate_new_product};

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Product as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub images: Vec<String>,
    pub category: String,
    pub brand: String,
    pub stock: u32,
    pub rating: f32,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductBody {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            images: product.images.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            stock: product.stock,
            rating: product.rating,
            review_count: product.review_count,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

fn bodies(products: &[Product]) -> Vec<ProductBody> {
    products.iter().map(ProductBody::from).collect()
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

/// Handle `GET /api/products?page=&limit=`.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let (products, total) = state.products().page(page, limit).await;
    if products.is_empty() {
        return Err(ApiError::NotFound("No products found".to_owned()));
    }

    let pages = total.div_ceil(limit as usize);

    Ok(Json(json!({
        "success": true,
        "message": "Products retrieved successfully",
        "pagination": {
            "total": total,
            "page": page,
            "pages": pages,
        },
        "count": products.len(),
        "products": bodies(&products),
    })))
}

/// Handle `GET /api/products/search?keyword=`.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ClientIp(addr): ClientIp,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    state.admission().check_search(addr)?;

    let keyword = query.keyword.as_deref().unwrap_or("").trim().to_owned();
    if keyword.is_empty() {
        return Err(ApiError::Validation(vec![crate::error::FieldError::new(
            "keyword",
            "Search keyword is required",
        )]));
    }

    let products = state.products().search(&keyword).await;
    if products.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No products found matching \"{keyword}\""
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Search results for \"{keyword}\""),
        "count": products.len(),
        "products": bodies(&products),
    })))
}

/// Handle `GET /api/products/category/{category}`.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse> {
    let category = category.trim().to_owned();
    if category.is_empty() {
        return Err(ApiError::Validation(vec![crate::error::FieldError::new(
            "category",
            "Category is required",
        )]));
    }

    let products = state.products().in_category(&category).await;
    if products.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No products found in {category} category"
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Products in {category} category retrieved successfully"),
        "count": products.len(),
        "products": bodies(&products),
    })))
}

/// Handle `GET /api/products/{id}`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = id
        .parse::<i32>()
        .map(ProductId::new)
        .map_err(|_| ApiError::MalformedIdentifier)?;

    let product = state
        .products()
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Product retrieved successfully",
        "product": ProductBody::from(&product),
    })))
}

/// Handle `POST /api/products`.
///
/// Catalog-management entry point: rate limited on its own tier, validated,
/// and rejected as `Duplicate` when the name is taken.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    ClientIp(addr): ClientIp,
    Json(payload): Json<NewProductPayload>,
) -> Result<impl IntoResponse> {
    state.admission().check_catalog(addr)?;

    let new_product = validate_new_product(&payload).map_err(ApiError::Validation)?;

    let product = state
        .products()
        .create(new_product)
        .await
        .map_err(|_| ApiError::Duplicate("Product with this name already exists".to_owned()))?;

    tracing::info!(product_id = %product.id, "product added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product added successfully",
            "product": ProductBody::from(&product),
        })),
    ))
}
