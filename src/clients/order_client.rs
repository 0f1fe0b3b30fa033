//! # Order Client
//!
//! High-level API over a `ResourceClient<Order>`. Implements [`OrderBackend`] and turns
//! framework failures back into [`OrderError`].
use crate::clients::actor_client::ActorClient;
use crate::clients::backend::{NewOrder, OrderBackend, OrderSubscription};
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Order, OrderCreate, OrderId, OrderLineItem, OrderStatus, OrderUpdate};
use crate::order_actor::OrderError;
use crate::session::Session;
use async_trait::async_trait;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
///
/// Transition rules live in the record's `on_update` hook; this client only checks the
/// caller's session and shapes the results.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    async fn require(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        if let Some(err) = e.entity_error::<OrderError>() {
            return err.clone();
        }
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::BackendUnavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl OrderBackend for OrderClient {
    #[instrument(skip(self, session, order), fields(user_id = %session.user_id()))]
    async fn create_order(&self, session: &Session, order: NewOrder) -> Result<Order, OrderError> {
        session
            .require_active()
            .map_err(|e| OrderError::Validation(e.to_string()))?;
        if order.items.is_empty() {
            return Err(OrderError::Validation("order has no items".into()));
        }
        debug!(restaurant = %order.restaurant.name, lines = order.items.len(), "create_order called");

        let params = OrderCreate {
            user_id: session.user_id().clone(),
            restaurant: order.restaurant,
            items: order.items,
            total: order.total,
            delivery_address: order.delivery_address,
            payment_method: order.payment_method,
        };
        let order_id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(%order_id, "Order placed");
        self.require(order_id).await
    }

    #[instrument(skip(self))]
    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner
            .update(order_id, OrderUpdate { status })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn subscribe_to_order_changes(&self, order_id: OrderId) -> Result<OrderSubscription, OrderError> {
        let receiver = self
            .inner
            .subscribe(order_id)
            .await
            .map_err(Self::map_error)?;
        Ok(OrderSubscription::new(order_id, receiver))
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.require(order_id).await
    }

    async fn fetch_order_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>, OrderError> {
        Ok(self.require(order_id).await?.items)
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn orders_for_user(&self, session: &Session) -> Result<Vec<Order>, OrderError> {
        session
            .require_active()
            .map_err(|e| OrderError::Validation(e.to_string()))?;
        let mut orders: Vec<Order> = self
            .list()
            .await?
            .into_iter()
            .filter(|o| &o.user_id == session.user_id())
            .collect();
        orders.sort_by_key(|o| Reverse((o.created_at, o.id)));
        debug!(count = orders.len(), "Orders listed");
        Ok(orders)
    }
}
