use crate::checkout::{CheckoutError, CheckoutRequest, CheckoutService, RestaurantCatalog};
use crate::clients::{OrderBackend, OrderClient};
use crate::config::EngineConfig;
use crate::model::{Cart, Order, OrderId};
use crate::order_actor::{self, OrderContext, OrderError};
use crate::session::Session;
use crate::tracking::{Clock, OrderNotifier, OrderTracker, TokioClock, TrackerRegistry, TracingNotifier};
use std::sync::Arc;
use tracing::{error, info};

/// The runtime orchestrator: the Order actor, checkout, and the live trackers.
///
/// # Architecture
///
/// - **Order actor**: owns every order record and its change channel
/// - **Checkout**: cart to order, through the [`OrderBackend`] port
/// - **Trackers**: one per watched order, keyed by id in a [`TrackerRegistry`]
///
/// # Example
///
/// ```ignore
/// let mut system = OrderSystem::new(EngineConfig::from_env()?);
/// let order = system.place_order(&session, &mut cart, &request).await?;
/// let tracker = system.track(order.id, &session).await?;
/// tracker.request_cancel().await?;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Client for interacting with the Order actor
    pub order_client: OrderClient,
    checkout: CheckoutService,
    trackers: TrackerRegistry,
    notifier: Arc<dyn OrderNotifier>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the system on tokio's clock, logging notifications and with an empty
    /// restaurant catalog.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(TokioClock::new()),
            Arc::new(TracingNotifier),
            RestaurantCatalog::new(),
        )
    }

    /// Starts the system with explicit collaborators.
    pub fn with_parts(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn OrderNotifier>,
        catalog: RestaurantCatalog,
    ) -> Self {
        // The actor gets its clock at run(), not at construction.
        let (order_actor, order_resource_client) = order_actor::new(config.channel_capacity);
        let order_handle = tokio::spawn(order_actor.run(OrderContext::new(clock.clone())));
        let order_client = OrderClient::new(order_resource_client);

        let checkout = CheckoutService::new(Arc::new(order_client.clone()), catalog, &config);

        Self {
            order_client,
            checkout,
            trackers: TrackerRegistry::new(),
            notifier,
            clock,
            config,
            handles: vec![order_handle],
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> Arc<dyn OrderBackend> {
        Arc::new(self.order_client.clone())
    }

    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    pub async fn place_order(
        &self,
        session: &Session,
        cart: &mut Cart,
        request: &CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        self.checkout.place_order(session, cart, request).await
    }

    /// Starts tracking an order, replacing any tracker already watching it.
    pub async fn track(&mut self, order_id: OrderId, session: &Session) -> Result<&OrderTracker, OrderError> {
        let tracker = OrderTracker::attach(
            order_id,
            self.backend(),
            self.notifier.clone(),
            session.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
        .await?;
        Ok(self.trackers.insert(tracker).await)
    }

    pub fn tracker(&self, order_id: OrderId) -> Option<&OrderTracker> {
        self.trackers.get(order_id)
    }

    pub fn tracked_count(&self) -> usize {
        self.trackers.len()
    }

    /// Stops tracking an order. Returns false if it was not tracked.
    pub async fn untrack(&mut self, order_id: OrderId) -> bool {
        self.trackers.remove(order_id).await
    }

    /// Gracefully shuts down the system.
    ///
    /// Trackers are detached first, since each holds a client. Then every client is
    /// dropped so the actor's receiver closes, and the actor tasks are awaited.
    pub async fn shutdown(mut self) -> Result<(), String> {
        info!(trackers = self.trackers.len(), "Shutting down system...");
        self.trackers.clear().await;

        drop(self.checkout);
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
