//! The order backend port.
//!
//! Everything the lifecycle engine needs from the durable order store. [`OrderClient`]
//! implements it over the in-process Order actor; tests wrap it to inject failures.
//!
//! [`OrderClient`]: crate::clients::OrderClient

use crate::model::{LineItemDraft, Order, OrderId, OrderLineItem, OrderStatus, PaymentMethod, RestaurantSnapshot};
use crate::order_actor::OrderError;
use crate::session::Session;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::watch;

/// Everything checkout supplies for a new order. The owner comes from the session.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub restaurant: RestaurantSnapshot,
    pub items: Vec<LineItemDraft>,
    pub total: Decimal,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
}

/// Push feed of one order's writes. Dropping it unsubscribes.
#[derive(Debug)]
pub struct OrderSubscription {
    order_id: OrderId,
    receiver: watch::Receiver<Order>,
}

impl OrderSubscription {
    pub fn new(order_id: OrderId, receiver: watch::Receiver<Order>) -> Self {
        Self { order_id, receiver }
    }

    /// The latest state, marking it seen.
    pub fn current(&mut self) -> Order {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next write and returns the new state.
    ///
    /// Cancel-safe. Fails once the record is gone or the backend stopped.
    pub async fn changed(&mut self) -> Result<Order, OrderError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| OrderError::BackendUnavailable(format!("{} feed closed", self.order_id)))?;
        Ok(self.receiver.borrow_and_update().clone())
    }
}

#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Writes the order and its lines together.
    ///
    /// # Errors
    /// [`OrderError::Validation`] when the items are empty or the session has ended.
    async fn create_order(&self, session: &Session, order: NewOrder) -> Result<Order, OrderError>;

    /// # Errors
    /// [`OrderError::NotFound`] for an unknown id, [`OrderError::Conflict`] when the
    /// record refuses the transition.
    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderError>;

    /// Opens the order's change feed, primed with its current state.
    ///
    /// # Errors
    /// [`OrderError::NotFound`] for an unknown id.
    async fn subscribe_to_order_changes(&self, order_id: OrderId) -> Result<OrderSubscription, OrderError>;

    /// One read of the record, for screens that do not track it.
    ///
    /// # Errors
    /// [`OrderError::NotFound`] for an unknown id, [`OrderError::BackendUnavailable`]
    /// when the store cannot be reached.
    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, OrderError>;

    /// The order's line items, numbered from 1 in cart order.
    ///
    /// # Errors
    /// Same as [`OrderBackend::fetch_order`].
    async fn fetch_order_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>, OrderError>;

    /// The session user's orders, newest first.
    async fn orders_for_user(&self, session: &Session) -> Result<Vec<Order>, OrderError>;
}
