use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: u32,
    pub quantity: u32,
}

#[async_trait]
pub trait CartState: Send + Sync {
    /// Current line items for `user_id`; unknown users have an empty cart.
    async fn items(&self, user_id: &str) -> Vec<LineItem>;
    /// Adds `quantity` of a product, merging into an existing line.
    /// Returns the cart after the update.
    async fn add_item(&self, user_id: &str, product_id: u32, quantity: u32) -> Result<Vec<LineItem>, AppError>;
    /// Removes and returns every line item, leaving the cart empty.
    async fn take_items(&self, user_id: &str) -> Vec<LineItem>;
    /// Get current number of carts for monitoring
    fn get_active_carts_count(&self) -> usize;
}

/// Carts keyed by user id. Each update holds only that key's shard lock, so
/// concurrent adds for one user serialize while other users proceed.
#[derive(Default)]
pub struct InMemoryCartState {
    carts: DashMap<String, Vec<LineItem>>,
}

impl InMemoryCartState {
    pub fn new() -> Self {
        Self {
            carts: DashMap::new(),
        }
    }
}

#[async_trait]
impl CartState for InMemoryCartState {
    async fn items(&self, user_id: &str) -> Vec<LineItem> {
        self.carts
            .get(user_id)
            .map(|cart| cart.value().clone())
            .unwrap_or_default()
    }

    async fn add_item(&self, user_id: &str, product_id: u32, quantity: u32) -> Result<Vec<LineItem>, AppError> {
        let mut cart = self.carts.entry(user_id.to_string()).or_default();

        match cart.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "quantity for product {} would exceed {}",
                        product_id,
                        u32::MAX
                    ))
                })?;
            }
            None => cart.push(LineItem { product_id, quantity }),
        }

        Ok(cart.clone())
    }

    async fn take_items(&self, user_id: &str) -> Vec<LineItem> {
        self.carts
            .get_mut(user_id)
            .map(|mut cart| std::mem::take(cart.value_mut()))
            .unwrap_or_default()
    }

    fn get_active_carts_count(&self) -> usize {
        self.carts.len()
    }
}
