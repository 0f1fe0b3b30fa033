#![allow(dead_code)]

use async_trait::async_trait;
use foodgo_orders::checkout::{CheckoutRequest, DeliveryAddress, RestaurantCatalog};
use foodgo_orders::clients::{NewOrder, OrderBackend, OrderClient, OrderSubscription};
use foodgo_orders::config::EngineConfig;
use foodgo_orders::model::{
    Cart, CartItem, Order, OrderId, OrderLineItem, OrderStatus, PaymentMethod, UserId,
};
use foodgo_orders::order_actor::OrderError;
use foodgo_orders::runtime::OrderSystem;
use foodgo_orders::session::{Session, SessionManager};
use foodgo_orders::tracking::{ChannelNotifier, RelayPayload, TokioClock};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub struct Harness {
    pub system: OrderSystem,
    pub sessions: SessionManager,
    pub session: Session,
    pub clock: Arc<TokioClock>,
    pub relay: mpsc::UnboundedReceiver<RelayPayload>,
}

/// A running system on tokio's clock with a logged-in user "Sara".
pub fn harness() -> Harness {
    let clock = Arc::new(TokioClock::new());
    let (notifier, relay) = ChannelNotifier::new();
    let catalog = RestaurantCatalog::new()
        .with_restaurant("Burger Palace", "/burger-palace.png", Some(dec!(1.50)))
        .with_restaurant("Sushi Bar", "/sushi-bar.png", None);
    let system = OrderSystem::with_parts(
        EngineConfig::default(),
        clock.clone(),
        Arc::new(notifier),
        catalog,
    );
    let mut sessions = SessionManager::new();
    let session = sessions.login(UserId("user_1".into()), "Sara");
    Harness {
        system,
        sessions,
        session,
        clock,
        relay,
    }
}

pub fn burger_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add_item(
        CartItem::new("burger-1", "Burger", dec!(6.50), "Burger Palace")
            .with_quantity(2)
            .with_instructions("no onions"),
    )
    .unwrap();
    cart.add_item(CartItem::new("fries-1", "Fries", dec!(2.00), "Burger Palace"))
        .unwrap();
    cart
}

pub fn house_request() -> CheckoutRequest {
    CheckoutRequest {
        address: DeliveryAddress::House {
            city: "Manama".into(),
            block: "338".into(),
            road: "3803".into(),
            house_number: "12".into(),
        },
        notes: None,
        payment_method: PaymentMethod::Card,
    }
}

/// Places the burger cart for the harness user.
pub async fn place_burger_order(h: &Harness) -> Order {
    let mut cart = burger_cart();
    h.system
        .place_order(&h.session, &mut cart, &house_request())
        .await
        .unwrap()
}

/// Wraps an [`OrderClient`] and misbehaves on request: failed or ignored writes,
/// slow writes, and a change feed that never moves.
pub struct FlakyBackend {
    inner: OrderClient,
    failing_updates: AtomicUsize,
    failing_creates: AtomicUsize,
    ignored_updates: AtomicUsize,
    update_delay: Duration,
    cancel_delay: Duration,
    frozen_feed: bool,
    feeds: Mutex<Vec<watch::Sender<Order>>>,
    pub update_attempts: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(inner: OrderClient) -> Self {
        Self {
            inner,
            failing_updates: AtomicUsize::new(0),
            failing_creates: AtomicUsize::new(0),
            ignored_updates: AtomicUsize::new(0),
            update_delay: Duration::ZERO,
            cancel_delay: Duration::ZERO,
            frozen_feed: false,
            feeds: Mutex::new(Vec::new()),
            update_attempts: AtomicUsize::new(0),
        }
    }

    /// The next `count` status writes answer with the unchanged record.
    pub fn ignore_updates(self, count: usize) -> Self {
        self.ignored_updates.store(count, Ordering::SeqCst);
        self
    }

    /// Every status write other than a cancel waits `delay` before reaching the record.
    pub fn delay_updates(mut self, delay: Duration) -> Self {
        self.update_delay = delay;
        self
    }

    /// Every cancel waits `delay` before reaching the record.
    pub fn delay_cancels(mut self, delay: Duration) -> Self {
        self.cancel_delay = delay;
        self
    }

    /// Subscriptions see the record as it was when they were opened, and nothing after.
    pub fn freeze_feed(mut self) -> Self {
        self.frozen_feed = true;
        self
    }

    pub fn fail_updates(self, count: usize) -> Self {
        self.failing_updates.store(count, Ordering::SeqCst);
        self
    }

    pub fn fail_creates(self, count: usize) -> Self {
        self.failing_creates.store(count, Ordering::SeqCst);
        self
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl OrderBackend for FlakyBackend {
    async fn create_order(&self, session: &Session, order: NewOrder) -> Result<Order, OrderError> {
        if Self::take_failure(&self.failing_creates) {
            return Err(OrderError::BackendUnavailable("injected create failure".into()));
        }
        self.inner.create_order(session, order).await
    }

    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);
        let delay = if status == OrderStatus::Cancelled {
            self.cancel_delay
        } else {
            self.update_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if Self::take_failure(&self.failing_updates) {
            return Err(OrderError::BackendUnavailable("injected update failure".into()));
        }
        if Self::take_failure(&self.ignored_updates) {
            return self.inner.fetch_order(order_id).await;
        }
        self.inner.update_order_status(order_id, status).await
    }

    async fn subscribe_to_order_changes(&self, order_id: OrderId) -> Result<OrderSubscription, OrderError> {
        if !self.frozen_feed {
            return self.inner.subscribe_to_order_changes(order_id).await;
        }
        let (sender, receiver) = watch::channel(self.inner.fetch_order(order_id).await?);
        self.feeds.lock().unwrap().push(sender);
        Ok(OrderSubscription::new(order_id, receiver))
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.inner.fetch_order(order_id).await
    }

    async fn fetch_order_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>, OrderError> {
        self.inner.fetch_order_items(order_id).await
    }

    async fn orders_for_user(&self, session: &Session) -> Result<Vec<Order>, OrderError> {
        self.inner.orders_for_user(session).await
    }
}
