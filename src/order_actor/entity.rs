//! [`ActorEntity`] implementation for [`Order`].
//!
//! The record enforces the lifecycle on every write:
//! - writing the current status again is accepted and changes nothing
//! - `delivered` and `cancelled` are absorbing
//! - `cancelled` is reachable from any other status
//! - forward moves go exactly one step along the sequence
//!
//! The cancellation window is not checked here. It is a client-side gate.

use crate::framework::ActorEntity;
use crate::model::{Order, OrderCreate, OrderId, OrderLineItem, OrderStatus, OrderUpdate};
use crate::order_actor::OrderError;
use crate::tracking::Clock;
use async_trait::async_trait;
use chrono::DateTime;
use std::sync::Arc;
use tracing::debug;

/// Dependencies injected into the Order actor at `run()`.
#[derive(Clone)]
pub struct OrderContext {
    /// Stamps `created_at`.
    pub clock: Arc<dyn Clock>,
}

impl OrderContext {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Context = OrderContext;
    type Error = OrderError;

    /// Builds the order and its lines in one step. `created_at` is a placeholder until
    /// `on_create` stamps it.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::Validation("order has no items".into()));
        }
        if params.total.is_sign_negative() {
            return Err(OrderError::Validation(format!(
                "total {} is negative",
                params.total
            )));
        }
        if params.delivery_address.trim().is_empty() {
            return Err(OrderError::Validation("delivery address is empty".into()));
        }

        let items = params
            .items
            .into_iter()
            .zip(1u32..)
            .map(|(draft, line_id)| OrderLineItem {
                id: line_id,
                order_id: id,
                menu_item_id: draft.menu_item_id,
                item_name: draft.item_name,
                quantity: draft.quantity,
                unit_price: draft.unit_price,
                restaurant_name: draft.restaurant_name,
                restaurant_image: draft.restaurant_image,
                special_instructions: draft.special_instructions,
            })
            .collect();

        Ok(Self {
            id,
            user_id: params.user_id,
            restaurant: params.restaurant,
            total: params.total,
            delivery_address: params.delivery_address,
            payment_method: params.payment_method,
            status: OrderStatus::Confirmed,
            created_at: DateTime::UNIX_EPOCH,
            items,
        })
    }

    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), OrderError> {
        self.created_at = ctx.clock.now();
        Ok(())
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &OrderContext) -> Result<(), OrderError> {
        let (from, to) = (self.status, update.status);
        if from == to {
            debug!(order_id = %self.id, status = %to, "Status unchanged");
            return Ok(());
        }
        if to == OrderStatus::Unrecognized {
            return Err(OrderError::Validation("unrecognized target status".into()));
        }
        if from.is_terminal() {
            return Err(OrderError::Conflict { from, to });
        }
        let allowed = to == OrderStatus::Cancelled || from.next() == Some(to);
        if !allowed {
            return Err(OrderError::Conflict { from, to });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItemDraft, PaymentMethod, RestaurantSnapshot, UserId};
    use crate::tracking::ManualClock;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn create_params() -> OrderCreate {
        OrderCreate {
            user_id: UserId("u1".into()),
            restaurant: RestaurantSnapshot::from_name("Burger Palace", ""),
            items: vec![LineItemDraft {
                menu_item_id: "b1".into(),
                item_name: "Burger".into(),
                quantity: 2,
                unit_price: dec!(6.50),
                restaurant_name: "Burger Palace".into(),
                restaurant_image: String::new(),
                special_instructions: None,
            }],
            total: dec!(15.00),
            delivery_address: "House 1, Road 2, Block 3, Manama".into(),
            payment_method: PaymentMethod::Card,
        }
    }

    fn context() -> OrderContext {
        OrderContext::new(Arc::new(ManualClock::new(Utc::now())))
    }

    async fn set(order: &mut Order, status: OrderStatus) -> Result<(), OrderError> {
        order.on_update(OrderUpdate { status }, &context()).await
    }

    #[tokio::test]
    async fn test_create_stamps_clock_and_numbers_lines() {
        let ctx = context();
        let mut order = Order::from_create_params(OrderId(4), create_params()).unwrap();
        order.on_create(&ctx).await.unwrap();
        assert_eq!(order.created_at, ctx.clock.now());
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.items[0].id, 1);
        assert_eq!(order.items[0].order_id, OrderId(4));
    }

    #[test]
    fn test_create_rejects_empty_items() {
        let mut params = create_params();
        params.items.clear();
        assert!(matches!(
            Order::from_create_params(OrderId(1), params),
            Err(OrderError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_forward_only_and_absorbing() {
        let mut order = Order::from_create_params(OrderId(1), create_params()).unwrap();

        assert_eq!(
            set(&mut order, OrderStatus::OutForDelivery).await,
            Err(OrderError::Conflict {
                from: OrderStatus::Confirmed,
                to: OrderStatus::OutForDelivery
            })
        );
        set(&mut order, OrderStatus::Preparing).await.unwrap();
        set(&mut order, OrderStatus::Preparing).await.unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
        assert!(set(&mut order, OrderStatus::Confirmed).await.is_err());

        set(&mut order, OrderStatus::Cancelled).await.unwrap();
        assert!(matches!(
            set(&mut order, OrderStatus::OutForDelivery).await,
            Err(OrderError::Conflict { .. })
        ));
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_delivered_cannot_be_cancelled() {
        let mut order = Order::from_create_params(OrderId(1), create_params()).unwrap();
        for status in [
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            set(&mut order, status).await.unwrap();
        }
        assert!(set(&mut order, OrderStatus::Cancelled).await.is_err());
    }
}
