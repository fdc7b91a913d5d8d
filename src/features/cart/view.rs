//! Response shapes for carts and orders, priced against the catalog.

use serde::Serialize;

use crate::{
    constants::orders,
    features::{
        cart::state::LineItem,
        catalog::{serialize_cents, Catalog, Product},
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    #[serde(serialize_with = "serialize_cents")]
    pub subtotal: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub user_id: String,
    pub items: Vec<CartLine>,
    pub item_count: usize,
    #[serde(serialize_with = "serialize_cents")]
    pub total: u64,
}

impl CartView {
    pub fn build(user_id: &str, items: &[LineItem], catalog: &Catalog) -> Self {
        let lines: Vec<CartLine> = items
            .iter()
            .filter_map(|item| {
                catalog.get(item.product_id).map(|product| CartLine {
                    product: product.clone(),
                    quantity: item.quantity,
                    subtotal: product.price_cents * u64::from(item.quantity),
                })
            })
            .collect();

        Self {
            user_id: user_id.to_string(),
            item_count: lines.len(),
            total: lines.iter().map(|l| l.subtotal).sum(),
            items: lines,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub status: &'static str,
    pub user_id: String,
    #[serde(serialize_with = "serialize_cents")]
    pub total: u64,
    pub items_count: usize,
}

impl OrderConfirmation {
    pub fn confirmed(order_number: u32, cart: &CartView) -> Self {
        Self {
            order_id: format!("{}{}", orders::PREFIX, order_number),
            status: "confirmed",
            user_id: cart.user_id.clone(),
            total: cart.total,
            items_count: cart.item_count,
        }
    }
}
