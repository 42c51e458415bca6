//! Catalog routes.
//!
//! Browsing is anonymous; catalog writes are admin-only; reviews require any
//! authenticated account. Collection responses omit review lists, the detail
//! endpoint carries them in submission order.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use orchard_core::{Envelope, PageContext, ProductId};

use crate::db::RepositoryError;
use crate::db::products::{PAGE_SIZE, ProductRepository, UpdateProduct};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::AccountService;
use crate::state::AppState;

/// How many products the showcase endpoint serves.
const TOP_RATED_LIMIT: i64 = 3;

/// Query parameters for the catalog listing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring filter on the product name.
    pub keyword: Option<String>,
    /// 1-based page number; anything below 1 is clamped to 1.
    pub page: Option<i64>,
}

/// Full product edit; every editable field is required.
///
/// `rating` and `numReviews` are derived from reviews and cannot be set here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub count_in_stock: i32,
}

/// Review submission body.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// Star rating, 1 through 5.
    pub rating: i32,
    pub comment: String,
}

/// Paginated keyword search over the catalog.
///
/// GET /api/products?keyword=&page=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    let page = query.page.unwrap_or(1).max(1);
    let keyword = query.keyword.as_deref().filter(|kw| !kw.is_empty());

    let (items, total_count) = products.search(keyword, page).await?;

    let context = PageContext::new(page, total_count, PAGE_SIZE, keyword.unwrap_or(""));
    Ok(Json(
        Envelope::success("Products Fetched Successfully", items).with_page_context(context),
    ))
}

/// The highest-rated products, for the storefront showcase.
///
/// GET /api/products/top
pub async fn top_products(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    let items = products.top_rated(TOP_RATED_LIMIT).await?;

    Ok(Json(Envelope::success(
        "Top Products Fetched Successfully",
        items,
    )))
}

/// Product detail with its reviews.
///
/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product Not Found".to_owned()))?;

    Ok(Json(Envelope::success(
        "Product Fetched Successfully",
        product,
    )))
}

/// Create a placeholder product for the admin to edit afterwards (admin).
///
/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    let product = products.create(identity.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Product Created Successfully", product)),
    ))
}

/// Replace a product's editable fields (admin).
///
/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse> {
    if body.price < Decimal::ZERO {
        return Err(AppError::BadRequest("price cannot be negative".to_owned()));
    }
    if body.count_in_stock < 0 {
        return Err(AppError::BadRequest(
            "countInStock cannot be negative".to_owned(),
        ));
    }

    let products = ProductRepository::new(state.pool());
    let product = products
        .update(
            id,
            UpdateProduct {
                name: body.name,
                price: body.price,
                description: body.description,
                image: body.image,
                brand: body.brand,
                category: body.category,
                count_in_stock: body.count_in_stock,
            },
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product Not Found".to_owned())
            }
            other => AppError::Repository(other),
        })?;

    Ok(Json(Envelope::success(
        "Product Updated Successfully",
        product,
    )))
}

/// Delete a product (admin). Its reviews go with it; order snapshots that
/// reference it survive.
///
/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool());
    products.remove(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("Product Not Found".to_owned()),
        other => AppError::Repository(other),
    })?;

    Ok(Json(Envelope::success_empty("Product Removed Successfully")))
}

/// Append a review and fold it into the product's aggregate rating.
///
/// POST /api/products/{id}/reviews
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<ProductId>,
    Json(body): Json<ReviewRequest>,
) -> Result<impl IntoResponse> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_owned(),
        ));
    }

    // The review carries the reviewer's display name as it is right now.
    let accounts = AccountService::new(state.pool());
    let reviewer = accounts.get_user(identity.user_id).await?;

    let products = ProductRepository::new(state.pool());
    products
        .add_review(id, identity.user_id, &reviewer.name, body.rating, &body.comment)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product Not Found".to_owned())
            }
            RepositoryError::Conflict(_) => AppError::AlreadyReviewed,
            other => AppError::Repository(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success_empty("Review Added Successfully")),
    ))
}
