//! Lifecycle scenarios on a paused tokio clock.
//!
//! Every test starts at t0 = 0 with `start_paused = true`; tokio jumps the clock to the
//! next timer whenever all tasks are idle, so `sleep(20s)` lands exactly on the first
//! deadline.

mod common;

use common::{burger_cart, harness, place_burger_order, FlakyBackend};
use foodgo_orders::clients::{NewOrder, OrderBackend, OrderClient};
use foodgo_orders::config::EngineConfig;
use foodgo_orders::model::{LineItemDraft, Order, OrderStatus, PaymentMethod, RestaurantSnapshot};
use foodgo_orders::order_actor::{self, OrderContext};
use foodgo_orders::tracking::{
    CancelError, CancelWindow, ChannelNotifier, Clock, OrderTracker, RelayPayload, TokioClock,
    TrackerView, TracingNotifier,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

async fn wait_for_status(view: &mut watch::Receiver<TrackerView>, status: OrderStatus) {
    view.wait_for(|v| v.status == status)
        .await
        .expect("tracker stopped");
}

/// Asserts the clock reads `secs` after the order was created (timer granularity aside).
fn assert_at(clock: &TokioClock, order: &Order, secs: u64) {
    let elapsed = (clock.now() - order.created_at).to_std().unwrap();
    assert!(
        elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs + 1),
        "expected t0+{secs}s, got {elapsed:?}"
    );
}

async fn sleep_secs(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_at_19s_succeeds() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    let client = h.system.order_client.clone();
    let session = h.session.clone();
    let tracker = h.system.track(order.id, &session).await.unwrap();
    let mut view = tracker.subscribe();

    sleep_secs(19).await;
    assert_eq!(
        tracker.cancel_window(),
        CancelWindow {
            can_cancel: true,
            seconds_left: 1
        }
    );
    tracker.request_cancel().await.unwrap();
    wait_for_status(&mut view, OrderStatus::Cancelled).await;
    assert_eq!(tracker.progress_percent(), 0);
    assert_eq!(tracker.view().caption, "Cancelled");
    assert!(!tracker.cancel_window().can_cancel);

    // The 20s deadline passes without an advance.
    sleep_secs(30).await;
    assert_eq!(tracker.display_status(), OrderStatus::Cancelled);
    assert_eq!(
        client.fetch_order(order.id).await.unwrap().status,
        OrderStatus::Cancelled
    );

    assert_eq!(h.relay.recv().await, Some(RelayPayload::cancelled("Sara")));
    assert!(h.relay.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_full_progression_notifies_once() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    let session = h.session.clone();
    let tracker = h.system.track(order.id, &session).await.unwrap();
    let mut view = tracker.subscribe();
    assert_eq!(tracker.progress_percent(), 25);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(tracker.view().cancel_window.seconds_left, 10);
    assert!(tracker.cancel_window().can_cancel);

    for (status, secs, percent) in [
        (OrderStatus::Preparing, 20, 50),
        (OrderStatus::OutForDelivery, 30, 75),
        (OrderStatus::Delivered, 40, 100),
    ] {
        wait_for_status(&mut view, status).await;
        assert_at(&h.clock, &order, secs);
        assert_eq!(tracker.progress_percent(), percent);
    }

    let delivered = tracker.view();
    assert_eq!(delivered.caption, "Delivered!");
    assert_eq!(delivered.cancel_window, CancelWindow::CLOSED);
    assert!(delivered.timeline.iter().all(|step| step.completed));

    assert_eq!(
        h.relay.recv().await,
        Some(RelayPayload::delivered("Sara", "2 Burger (no onions), 1 Fries"))
    );
    sleep_secs(60).await;
    assert!(h.relay.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_late_attach_reconciles_immediately() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    sleep_secs(25).await;

    let session = h.session.clone();
    let tracker = h.system.track(order.id, &session).await.unwrap();
    let mut view = tracker.subscribe();
    wait_for_status(&mut view, OrderStatus::Preparing).await;
    assert_at(&h.clock, &order, 25);
    assert!(!tracker.cancel_window().can_cancel);

    wait_for_status(&mut view, OrderStatus::OutForDelivery).await;
    assert_at(&h.clock, &order, 30);
}

#[tokio::test(start_paused = true)]
async fn test_attach_after_every_deadline_catches_up_step_by_step() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    sleep_secs(45).await;

    let session = h.session.clone();
    let tracker = h.system.track(order.id, &session).await.unwrap();
    let mut view = tracker.subscribe();
    wait_for_status(&mut view, OrderStatus::Delivered).await;
    assert_at(&h.clock, &order, 45);

    assert_eq!(
        h.relay.recv().await,
        Some(RelayPayload::delivered("Sara", "2 Burger (no onions), 1 Fries"))
    );
    assert!(h.relay.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_window_is_refused() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    let session = h.session.clone();
    let tracker = h.system.track(order.id, &session).await.unwrap();

    sleep_secs(21).await;
    assert_eq!(tracker.display_status(), OrderStatus::Preparing);
    assert_eq!(tracker.request_cancel().await, Err(CancelError::WindowClosed));
    assert_eq!(tracker.display_status(), OrderStatus::Preparing);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_delivery_reports_terminal_state() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    let session = h.session.clone();
    let tracker = h.system.track(order.id, &session).await.unwrap();
    let mut view = tracker.subscribe();

    wait_for_status(&mut view, OrderStatus::Delivered).await;
    assert_eq!(
        tracker.request_cancel().await,
        Err(CancelError::TerminalState(OrderStatus::Delivered))
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_advance_waits_for_reattach() {
    let h = harness();
    let order = place_burger_order(&h).await;
    let flaky = Arc::new(FlakyBackend::new(h.system.order_client.clone()).fail_updates(1));

    let tracker = OrderTracker::attach(
        order.id,
        flaky.clone(),
        Arc::new(TracingNotifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();

    sleep_secs(35).await;
    assert_eq!(tracker.display_status(), OrderStatus::Confirmed);
    assert_eq!(flaky.update_attempts.load(Ordering::SeqCst), 1);
    drop(tracker);

    let tracker = OrderTracker::attach(
        order.id,
        flaky.clone(),
        Arc::new(TracingNotifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();
    let mut view = tracker.subscribe();
    wait_for_status(&mut view, OrderStatus::OutForDelivery).await;
    assert_at(&h.clock, &order, 35);
}

#[tokio::test(start_paused = true)]
async fn test_failed_advance_resumes_on_external_change() {
    let h = harness();
    let order = place_burger_order(&h).await;
    let client = h.system.order_client.clone();
    let flaky = Arc::new(FlakyBackend::new(client.clone()).fail_updates(1));

    let tracker = OrderTracker::attach(
        order.id,
        flaky,
        Arc::new(TracingNotifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();
    let mut view = tracker.subscribe();

    sleep_secs(25).await;
    assert_eq!(tracker.display_status(), OrderStatus::Confirmed);

    client
        .update_order_status(order.id, OrderStatus::Preparing)
        .await
        .unwrap();
    wait_for_status(&mut view, OrderStatus::Preparing).await;
    wait_for_status(&mut view, OrderStatus::OutForDelivery).await;
    assert_at(&h.clock, &order, 30);
}

#[tokio::test(start_paused = true)]
async fn test_unapplied_advance_does_not_spin() {
    let h = harness();
    let order = place_burger_order(&h).await;
    let flaky = Arc::new(FlakyBackend::new(h.system.order_client.clone()).ignore_updates(1));

    let tracker = OrderTracker::attach(
        order.id,
        flaky.clone(),
        Arc::new(TracingNotifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();

    sleep_secs(35).await;
    assert_eq!(tracker.display_status(), OrderStatus::Confirmed);
    assert_eq!(flaky.update_attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_landing_after_advance_wins() {
    let h = harness();
    let order = place_burger_order(&h).await;
    let client = h.system.order_client.clone();
    let flaky = Arc::new(
        FlakyBackend::new(client.clone()).delay_cancels(Duration::from_millis(10)),
    );
    let (notifier, mut relay) = ChannelNotifier::new();

    let tracker = OrderTracker::attach(
        order.id,
        flaky.clone(),
        Arc::new(notifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();
    let mut view = tracker.subscribe();

    // Passes the gate at 19.998s and reaches the record after the 20s advance.
    tokio::time::sleep(Duration::from_millis(19_998)).await;
    let (cancelled, ()) = tokio::join!(
        tracker.request_cancel(),
        wait_for_status(&mut view, OrderStatus::Preparing)
    );
    cancelled.unwrap();
    wait_for_status(&mut view, OrderStatus::Cancelled).await;

    assert_eq!(flaky.update_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(
        client.fetch_order(order.id).await.unwrap().status,
        OrderStatus::Cancelled
    );

    sleep_secs(30).await;
    assert_eq!(tracker.display_status(), OrderStatus::Cancelled);
    assert_eq!(relay.recv().await, Some(RelayPayload::cancelled("Sara")));
    assert!(relay.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_advance_landing_after_cancel_is_refused() {
    let h = harness();
    let order = place_burger_order(&h).await;
    let client = h.system.order_client.clone();
    let flaky = Arc::new(
        FlakyBackend::new(client.clone())
            .delay_cancels(Duration::from_millis(5))
            .delay_updates(Duration::from_millis(5)),
    );
    let (notifier, mut relay) = ChannelNotifier::new();

    let tracker = OrderTracker::attach(
        order.id,
        flaky.clone(),
        Arc::new(notifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();
    let mut view = tracker.subscribe();

    // The cancel lands at 20.003s; the advance issued at 20s lands at 20.005s.
    tokio::time::sleep(Duration::from_millis(19_998)).await;
    tracker.request_cancel().await.unwrap();
    wait_for_status(&mut view, OrderStatus::Cancelled).await;

    sleep_secs(30).await;
    assert_eq!(flaky.update_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(tracker.display_status(), OrderStatus::Cancelled);
    assert_eq!(
        client.fetch_order(order.id).await.unwrap().status,
        OrderStatus::Cancelled
    );
    assert_eq!(relay.recv().await, Some(RelayPayload::cancelled("Sara")));
    assert!(relay.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_refused_when_record_is_already_delivered() {
    let h = harness();
    let order = place_burger_order(&h).await;
    let client = h.system.order_client.clone();
    let flaky = Arc::new(FlakyBackend::new(client.clone()).freeze_feed());

    let tracker = OrderTracker::attach(
        order.id,
        flaky,
        Arc::new(TracingNotifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();

    sleep_secs(5).await;
    for status in [
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ] {
        client.update_order_status(order.id, status).await.unwrap();
    }
    // The tracker has not seen the writes, so only the record can refuse.
    assert_eq!(tracker.display_status(), OrderStatus::Confirmed);
    assert!(tracker.cancel_window().can_cancel);
    assert_eq!(
        tracker.request_cancel().await,
        Err(CancelError::TerminalState(OrderStatus::Delivered))
    );
    assert_eq!(
        client.fetch_order(order.id).await.unwrap().status,
        OrderStatus::Delivered
    );
}

#[tokio::test(start_paused = true)]
async fn test_tracker_stops_when_feed_closes() {
    let h = harness();
    let (actor, generic) = order_actor::new(8);
    let actor_task = tokio::spawn(actor.run(OrderContext::new(h.clock.clone())));
    let client = OrderClient::new(generic);

    let order = client
        .create_order(
            &h.session,
            NewOrder {
                restaurant: RestaurantSnapshot::from_name("Burger Palace", ""),
                items: burger_cart().items().iter().map(LineItemDraft::from).collect(),
                total: rust_decimal_macros::dec!(16.50),
                delivery_address: "House 12, Road 3803, Block 338, Manama".into(),
                payment_method: PaymentMethod::Apple,
            },
        )
        .await
        .unwrap();
    let tracker = OrderTracker::attach(
        order.id,
        Arc::new(client.clone()),
        Arc::new(TracingNotifier),
        h.session.clone(),
        h.clock.clone(),
        EngineConfig::default(),
    )
    .await
    .unwrap();
    assert!(!tracker.is_finished());

    actor_task.abort();
    let _ = actor_task.await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(tracker.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_other_users_order_is_not_trackable() {
    let mut h = harness();
    let order = place_burger_order(&h).await;
    let intruder = h
        .sessions
        .login(foodgo_orders::model::UserId("user_2".into()), "Omar");
    assert!(h.system.track(order.id, &intruder).await.is_err());
}
