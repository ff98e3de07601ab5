use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::storage::KeyValueStore;
use crate::utils::rupiah::format_rupiah;

/// Local storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "masganCart";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

/// One row of the cart view, amounts already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub index: usize,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the saved cart. Missing or unreadable data gives an empty cart.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let raw = match store.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved cart");
                return Self::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable saved cart");
                Self::new()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> AppResult<()> {
        store.set(CART_STORAGE_KEY, serde_json::to_string(self)?)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of an item, merging with an existing line of the same name.
    pub fn add(&mut self, name: &str, price: i64, quantity: u32) -> AppResult<()> {
        if quantity == 0 {
            return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
        }
        if price < 0 {
            return Err(AppError::BadRequest("Price cannot be negative".to_string()));
        }

        match self.items.iter_mut().find(|item| item.name == name) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| AppError::BadRequest("Quantity too large".to_string()))?;
            }
            None => self.items.push(CartItem {
                name: name.to_string(),
                price,
                quantity,
            }),
        }
        Ok(())
    }

    /// Change a line's quantity by `delta`, dropping the line at zero.
    pub fn update_quantity(&mut self, index: usize, delta: i32) -> AppResult<()> {
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("No cart line at index {}", index)))?;

        let updated = i64::from(item.quantity) + i64::from(delta);
        if updated <= 0 {
            self.items.remove(index);
        } else {
            item.quantity = u32::try_from(updated)
                .map_err(|_| AppError::BadRequest("Quantity too large".to_string()))?;
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> AppResult<CartItem> {
        if index >= self.items.len() {
            return Err(AppError::NotFound(format!("No cart line at index {}", index)));
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn subtotal(&self) -> i64 {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(0, i64::saturating_add)
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| CartLine {
                index,
                name: item.name.clone(),
                unit_price: format_rupiah(item.price),
                quantity: item.quantity,
                line_total: format_rupiah(item.line_total()),
            })
            .collect()
    }
}
