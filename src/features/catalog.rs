//! Immutable product catalog seeded at startup.

use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

/// (id, name, category, price in cents, stock)
const SEED: &[(u32, &str, &str, u64, u32)] = &[
    (1, "Laptop Pro 15", "electronics", 129_999, 25),
    (2, "Wireless Mouse", "electronics", 2_999, 150),
    (3, "USB-C Hub", "electronics", 4_999, 80),
    (4, "Mechanical Keyboard", "electronics", 14_999, 40),
    (5, "4K Monitor", "electronics", 39_999, 12),
    (6, "Headphones Pro", "audio", 19_999, 30),
    (7, "Bluetooth Speaker", "audio", 7_999, 0),
    (8, "Webcam HD", "electronics", 8_999, 60),
    (9, "Desk Lamp", "home", 3_499, 45),
    (10, "Ergonomic Chair", "furniture", 29_999, 8),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: String,
    #[serde(rename = "price", serialize_with = "serialize_cents")]
    pub price_cents: u64,
    pub stock: u32,
}

/// Renders an amount held in cents as a decimal JSON number (`2999` -> `29.99`).
pub fn serialize_cents<S: Serializer>(cents: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(cents_to_decimal(*cents))
}

fn cents_to_decimal(cents: u64) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    pub fn seeded() -> Self {
        Self::new(
            SEED.iter()
                .map(|&(id, name, category, price_cents, stock)| Product {
                    id,
                    name: name.to_string(),
                    category: category.to_string(),
                    price_cents,
                    stock,
                })
                .collect(),
        )
    }

    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Products in catalog order, optionally restricted to one category.
    pub fn list(&self, category: Option<&str>) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
