//! The backend-owned order record and its line items.
//!
//! An [`Order`] is created once at checkout and afterwards only its `status` changes.
//! See [`impl ActorEntity for Order`](crate::order_actor) for the write rules.

use crate::model::CartItem;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Identity of the account that owns an order. Issued by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Restaurant identity captured at checkout. Never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantSnapshot {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl RestaurantSnapshot {
    /// Builds the snapshot for a restaurant known only by name.
    ///
    /// The id is the name lower-cased with every whitespace run replaced by `-`.
    pub fn from_name(name: &str, image: impl Into<String>) -> Self {
        let id = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self {
            id,
            name: name.to_string(),
            image: image.into(),
        }
    }
}

/// How the customer intends to pay. A tag only; nothing is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
    Apple,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Apple => "apple",
        })
    }
}

/// Lifecycle status of an order.
///
/// `Confirmed -> Preparing -> OutForDelivery -> Delivered`, with `Cancelled` reachable
/// from every non-terminal state. `Unrecognized` absorbs any status string the engine
/// does not know, so reading a foreign record never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unrecognized,
}

impl OrderStatus {
    /// The forward sequence, in order.
    pub const FORWARD: [OrderStatus; 4] = [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unrecognized => "unrecognized",
        }
    }

    /// `Delivered` and `Cancelled` are absorbing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position in [`OrderStatus::FORWARD`], or `None` off the forward sequence.
    pub fn forward_index(&self) -> Option<usize> {
        Self::FORWARD.iter().position(|s| s == self)
    }

    /// The next forward status, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        self.forward_index()
            .and_then(|i| Self::FORWARD.get(i + 1))
            .copied()
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "confirmed" => OrderStatus::Confirmed,
            "preparing" => OrderStatus::Preparing,
            "out_for_delivery" => OrderStatus::OutForDelivery,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unrecognized,
        })
    }
}

/// A placed order.
///
/// # Actor Framework
/// Owned by a [`ResourceActor`](crate::framework::ResourceActor); `created_at` is stamped
/// from the actor's clock in `on_create` and is the time origin of the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub restaurant: RestaurantSnapshot,
    pub total: Decimal,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineItem>,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// One line of a placed order. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: u32,
    pub order_id: OrderId,
    /// Menu item this line was ordered from, used when reordering.
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub restaurant_name: String,
    pub restaurant_image: String,
    pub special_instructions: Option<String>,
}

/// A line item before it has an order to belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemDraft {
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub restaurant_name: String,
    pub restaurant_image: String,
    pub special_instructions: Option<String>,
}

impl From<&CartItem> for LineItemDraft {
    fn from(item: &CartItem) -> Self {
        Self {
            menu_item_id: item.id.clone(),
            item_name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            restaurant_name: item.restaurant.clone(),
            restaurant_image: item.image.clone(),
            special_instructions: item.special_instructions.clone(),
        }
    }
}

/// Payload for creating a new order. The order and its lines are written together.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub restaurant: RestaurantSnapshot,
    pub items: Vec<LineItemDraft>,
    pub total: Decimal,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
}

/// The only write an order accepts after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: OrderStatus,
}

/// A user's orders split for the history screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderHistory {
    /// Still moving through the lifecycle.
    pub current: Vec<Order>,
    /// Delivered or cancelled.
    pub past: Vec<Order>,
}

impl OrderHistory {
    /// Keeps the incoming order within each group.
    pub fn split(orders: Vec<Order>) -> Self {
        let (past, current) = orders.into_iter().partition(|o| o.status.is_terminal());
        Self { current, past }
    }
}
