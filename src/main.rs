//! # FoodGo order demo
//!
//! Runs one order end to end:
//! 1. Log in and fill a cart, hitting the single-restaurant conflict on the way.
//! 2. Check out.
//! 3. Track the order until it is delivered.

use foodgo_orders::checkout::{CheckoutRequest, DeliveryAddress, RestaurantCatalog};
use foodgo_orders::config::EngineConfig;
use foodgo_orders::model::{Cart, CartError, CartItem, OrderStatus, PaymentMethod, UserId};
use foodgo_orders::runtime::{setup_tracing, OrderSystem};
use foodgo_orders::session::SessionManager;
use foodgo_orders::tracking::{TokioClock, TracingNotifier};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let config = EngineConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting order demo");

    let catalog = RestaurantCatalog::new()
        .with_restaurant("Burger Palace", "/burger-palace.png", Some(dec!(1.50)))
        .with_restaurant("Sushi Bar", "/sushi-bar.png", None);
    let mut system = OrderSystem::with_parts(
        config,
        Arc::new(TokioClock::new()),
        Arc::new(TracingNotifier),
        catalog,
    );

    let mut sessions = SessionManager::new();
    let session = sessions.login(UserId("user_1".into()), "Sara");

    let span = tracing::info_span!("cart");
    let mut cart = async {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("sushi-1", "Salmon Roll", dec!(4.00), "Sushi Bar"))
            .map_err(|e| e.to_string())?;

        let burger = CartItem::new("burger-1", "Burger", dec!(6.50), "Burger Palace")
            .with_quantity(2)
            .with_image("/menu/burger.png")
            .with_instructions("no onions");
        match cart.add_item(burger.clone()) {
            Err(CartError::RestaurantConflict { current, incoming }) => {
                info!(%current, %incoming, "Starting a new cart");
                cart.replace_with(burger).map_err(|e| e.to_string())?;
            }
            other => other.map_err(|e| e.to_string())?,
        }
        cart.add_item(CartItem::new("fries-1", "Fries", dec!(2.00), "Burger Palace"))
            .map_err(|e| e.to_string())?;
        info!(subtotal = %cart.subtotal(), items = cart.total_item_count(), "Cart ready");
        Ok::<_, String>(cart)
    }
    .instrument(span)
    .await?;

    let request = CheckoutRequest {
        address: DeliveryAddress::House {
            city: "Manama".into(),
            block: "338".into(),
            road: "3803".into(),
            house_number: "12".into(),
        },
        notes: Some("Ring the bell".into()),
        payment_method: PaymentMethod::Cash,
    };
    let order = system
        .place_order(&session, &mut cart, &request)
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %order.id, total = %order.total, address = %order.delivery_address, "Order placed");

    let tracker = system
        .track(order.id, &session)
        .await
        .map_err(|e| e.to_string())?;
    let mut view = tracker.subscribe();
    loop {
        let current = view.borrow_and_update().clone();
        info!(
            status = %current.status,
            progress = current.progress_percent,
            seconds_left = current.cancel_window.seconds_left,
            "{}",
            current.caption
        );
        if current.status == OrderStatus::Delivered {
            break;
        }
        if view.changed().await.is_err() {
            warn!("Tracker stopped before delivery");
            break;
        }
    }

    sessions.logout();
    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
