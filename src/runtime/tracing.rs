//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); events carry
//! `entity_type` and `order_id` fields instead.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup, shutdown and final store size
//! - **Record writes**: Create, Update (including refused transitions), Subscribe
//! - **Tracker decisions**: auto-advance, status changes, failed writes, notifications
//! - **Checkout**: placed orders and failures that kept the cart
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run            # lifecycle milestones
//! RUST_LOG=debug cargo run           # full payloads and every decision
//! RUST_LOG=foodgo_orders::tracking=debug cargo run
//! ```
//!
//! ## Order Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Created entity_type="Order" id=order_1 size=1
//! INFO place_order: Order placed order_id=order_1
//! INFO place_order: Checkout complete order_id=order_1 total=15.00
//! INFO Tracker attached order_id=order_1
//! INFO Updated entity_type="Order" id=order_1
//! INFO order_tracker: Status changed order_id=order_1 from=confirmed to=preparing
//! ...
//! INFO order_tracker: Status changed order_id=order_1 from=out_for_delivery to=delivered
//! INFO Delivery notification body={"user_name":"Sara","order_name":"2 Burger (no onions), 1 Fries"}
//! ```
//!
//! A refused transition shows up as a warning on the actor side and, if it came from
//! the tracker, as a second warning in the `order_tracker` span:
//!
//! ```text
//! WARN Update failed entity_type="Order" id=order_1 error=Order cannot move from cancelled to preparing
//! WARN order_tracker: Auto-advance failed, waiting for next change order_id=order_1 to=preparing
//! ```

/// Initializes the tracing subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
