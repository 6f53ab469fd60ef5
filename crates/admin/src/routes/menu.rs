//! Menu management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use forno_core::menu::{MenuCategory, MenuProduct};
use forno_core::{CategoryId, ProductId};

use crate::db::{CategoryInput, MenuListing, MenuRepository, ProductInput};
use crate::error::Result;
use crate::state::AppState;

/// GET /api/menu
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<MenuListing>> {
    let listing = MenuRepository::new(state.pool()).listing().await?;
    Ok(Json(listing))
}

/// POST /api/menu/categories
#[instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<MenuCategory>)> {
    let input = input.validate()?;
    let category = MenuRepository::new(state.pool())
        .create_category(&input)
        .await?;

    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/menu/categories/{id}
#[instrument(skip(state, input), fields(category_id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<MenuCategory>> {
    let input = input.validate()?;
    let category = MenuRepository::new(state.pool())
        .update_category(id, &input)
        .await?;
    Ok(Json(category))
}

/// DELETE /api/menu/categories/{id}
///
/// Also deletes the category's products.
#[instrument(skip(state), fields(category_id = %id))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    MenuRepository::new(state.pool()).delete_category(id).await?;
    tracing::info!("category deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/menu/products
#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<MenuProduct>)> {
    let input = input.validate()?;
    let product = MenuRepository::new(state.pool())
        .create_product(&input)
        .await?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/menu/products/{id}
#[instrument(skip(state, input), fields(product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<MenuProduct>> {
    let input = input.validate()?;
    let product = MenuRepository::new(state.pool())
        .update_product(id, &input)
        .await?;
    Ok(Json(product))
}

/// DELETE /api/menu/products/{id}
#[instrument(skip(state), fields(product_id = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    MenuRepository::new(state.pool()).delete_product(id).await?;
    tracing::info!("product deleted");
    Ok(StatusCode::NO_CONTENT)
}
