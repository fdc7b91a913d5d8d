//! REST handlers for the simulated shop.
//!
//! Each handler suspends for the injected delay before touching any state,
//! so a caller that disconnects mid-delay leaves nothing half-done.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::Uri,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    config::{Fault, Operation},
    constants::service,
    errors::AppError,
    features::{
        cart::view::{CartView, OrderConfirmation},
        catalog::Product,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": service::NAME,
        "version": service::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "chaos_mode": state.runtime.chaos_mode(),
    }))
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, AppError> {
    state.injector.simulate_latency(Operation::Product).await;
    state.injector.inject(Fault::Database, Operation::Product)?;

    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let products = state.catalog.list(category);
    info!("Retrieved {} products", products.len());

    Ok(Json(json!({ "products": products, "count": products.len() })))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, AppError> {
    state.injector.simulate_latency(Operation::Product).await;

    let id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid product id: {}", raw_id)))?;

    // An unknown id is always reported as missing, whatever the failure rate.
    let product = match u32::try_from(id).ok().and_then(|id| state.catalog.get(id)) {
        Some(product) => product.clone(),
        None => {
            warn!("Product {} not found", id);
            return Err(AppError::ProductNotFound);
        }
    };

    state.injector.inject(Fault::Database, Operation::Product)?;
    info!("Retrieved product {}", product.id);
    Ok(Json(product))
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.injector.simulate_latency(Operation::Product).await;
    Json(json!({ "categories": state.catalog.categories() }))
}

pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<CartView> {
    state.injector.simulate_latency(Operation::Cart).await;

    let items = state.carts.items(&user_id).await;
    info!("Retrieved cart for user {}", user_id);
    Json(CartView::build(&user_id, &items, &state.catalog))
}

pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartView>, AppError> {
    state.injector.simulate_latency(Operation::Cart).await;

    let Json(request) = payload?;

    if request.quantity <= 0 {
        return Err(AppError::InvalidInput(format!(
            "quantity must be a positive integer, got {}",
            request.quantity
        )));
    }
    let quantity = u32::try_from(request.quantity).map_err(|_| {
        AppError::InvalidInput(format!("quantity {} is too large", request.quantity))
    })?;

    let product_id = match u32::try_from(request.product_id) {
        Ok(id) if state.catalog.contains(id) => id,
        _ => {
            warn!("Product {} not found", request.product_id);
            return Err(AppError::ProductNotFound);
        }
    };

    let items = state.carts.add_item(&user_id, product_id, quantity).await?;
    info!("Added product {} to cart for user {}", product_id, user_id);
    Ok(Json(CartView::build(&user_id, &items, &state.catalog)))
}

pub async fn checkout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<OrderConfirmation>, AppError> {
    state.injector.simulate_latency(Operation::Checkout).await;

    let Json(request) = payload?;
    let user_id = request.user_id;
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("user_id must not be empty".to_string()));
    }

    state.injector.inject(Fault::Payment, Operation::Checkout)?;

    // Taking the items is the emptiness check, so concurrent checkouts for
    // one user confirm at most one order.
    let items = state.carts.take_items(&user_id).await;
    if items.is_empty() {
        warn!("Checkout failed - empty cart for user {}", user_id);
        return Err(AppError::EmptyCart);
    }

    let cart = CartView::build(&user_id, &items, &state.catalog);
    let confirmation = OrderConfirmation::confirmed(state.injector.order_number(), &cart);
    info!(
        "Checkout successful for user {}, order {}",
        user_id, confirmation.order_id
    );
    Ok(Json(confirmation))
}

pub async fn not_found(State(state): State<Arc<AppState>>, uri: Uri) -> AppError {
    state.injector.simulate_latency(Operation::Base).await;
    AppError::RouteNotFound(uri.path().to_string())
}
