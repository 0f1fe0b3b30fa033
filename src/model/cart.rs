//! The shopping cart and its single-restaurant invariant.
//!
//! The cart is either empty or every line shares one restaurant name. Adding from a
//! different restaurant is refused with [`CartError::RestaurantConflict`] and leaves the
//! cart untouched; the caller confirms with the user and then calls
//! [`Cart::replace_with`] (or [`Cart::clear`] followed by [`Cart::add_item`]).

use crate::model::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Menu item id. Lines merge by this id.
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub restaurant: String,
    pub image: String,
    pub special_instructions: Option<String>,
}

impl CartItem {
    /// A single unit of a menu item.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        restaurant: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
            restaurant: restaurant.into(),
            image: String::new(),
            special_instructions: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(instructions.into());
        self
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Errors returned by cart operations. None of them mutate the cart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The item belongs to a different restaurant than the current cart.
    #[error("Cart holds items from {current}, cannot add items from {incoming}")]
    RestaurantConflict { current: String, incoming: String },

    #[error("Cart validation error: {0}")]
    Validation(String),
}

/// In-memory cart owned by one client session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `item`, merging into an existing line with the same id.
    ///
    /// # Errors
    /// - [`CartError::Validation`] for a zero quantity or negative price.
    /// - [`CartError::RestaurantConflict`] when the cart already holds another restaurant.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        Self::validate(&item)?;
        if let Some(current) = self.current_restaurant() {
            if current != item.restaurant {
                return Err(CartError::RestaurantConflict {
                    current: current.to_string(),
                    incoming: item.restaurant,
                });
            }
        }
        self.merge(item);
        Ok(())
    }

    /// Clears the cart and adds `item`. This is the confirmed answer to a conflict.
    pub fn replace_with(&mut self, item: CartItem) -> Result<(), CartError> {
        Self::validate(&item)?;
        self.items.clear();
        self.merge(item);
        Ok(())
    }

    /// Changes a line's quantity by `delta`. Reaching zero or below removes the line.
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, item_id: &str, delta: i32) {
        let Some(index) = self.items.iter().position(|i| i.id == item_id) else {
            return;
        };
        let next = i64::from(self.items[index].quantity) + i64::from(delta);
        if next <= 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    pub fn remove_item(&mut self, item_id: &str) {
        self.items.retain(|i| i.id != item_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Copies a past order's lines into the cart.
    ///
    /// Special instructions are carried over as labels. Returns the number of lines added.
    ///
    /// # Errors
    /// - [`CartError::Validation`] if the order has no items.
    /// - [`CartError::RestaurantConflict`] if the cart holds another restaurant. Use
    ///   [`Cart::reorder_replacing`] once the user agreed to start over.
    pub fn reorder(&mut self, order: &Order) -> Result<usize, CartError> {
        let incoming = Self::reorder_lines(order)?;
        if let (Some(current), Some(first)) = (self.current_restaurant(), incoming.first()) {
            if current != first.restaurant {
                return Err(CartError::RestaurantConflict {
                    current: current.to_string(),
                    incoming: first.restaurant.clone(),
                });
            }
        }
        let added = incoming.len();
        incoming.into_iter().for_each(|item| self.merge(item));
        Ok(added)
    }

    /// Clears the cart, then reorders.
    pub fn reorder_replacing(&mut self, order: &Order) -> Result<usize, CartError> {
        let incoming = Self::reorder_lines(order)?;
        self.items.clear();
        let added = incoming.len();
        incoming.into_iter().for_each(|item| self.merge(item));
        Ok(added)
    }

    /// Σ `unit_price * quantity`, computed on every call.
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Saturates at `u32::MAX`.
    pub fn total_item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, i| total.saturating_add(i.quantity))
    }

    /// Quantity of one menu item in the cart, zero if absent.
    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.id == item_id)
            .map_or(0, |i| i.quantity)
    }

    /// The restaurant every line shares, or `None` when empty.
    pub fn current_restaurant(&self) -> Option<&str> {
        self.items.first().map(|i| i.restaurant.as_str())
    }

    fn validate(item: &CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::Validation(format!(
                "quantity of {} must be positive",
                item.id
            )));
        }
        if item.unit_price.is_sign_negative() {
            return Err(CartError::Validation(format!(
                "price of {} must not be negative",
                item.id
            )));
        }
        if item.restaurant.trim().is_empty() {
            return Err(CartError::Validation(format!(
                "item {} has no restaurant",
                item.id
            )));
        }
        Ok(())
    }

    fn merge(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    fn reorder_lines(order: &Order) -> Result<Vec<CartItem>, CartError> {
        if order.items.is_empty() {
            return Err(CartError::Validation(format!(
                "no items found in {}",
                order.id
            )));
        }
        Ok(order
            .items
            .iter()
            .map(|line| {
                let restaurant = if line.restaurant_name.is_empty() {
                    order.restaurant.name.clone()
                } else {
                    line.restaurant_name.clone()
                };
                let image = if line.restaurant_image.is_empty() {
                    order.restaurant.image.clone()
                } else {
                    line.restaurant_image.clone()
                };
                CartItem {
                    id: line.menu_item_id.clone(),
                    name: line.item_name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    restaurant,
                    image,
                    special_instructions: line.special_instructions.clone(),
                }
            })
            .collect())
    }
}
