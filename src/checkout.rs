//! Checkout: turns a cart into a placed order.
//!
//! `total = subtotal + delivery fee`, where the fee comes from the restaurant catalog
//! and falls back to the configured default. The cart is cleared only after the order
//! was written; on any failure it is left as it was.

use crate::clients::{NewOrder, OrderBackend};
use crate::config::EngineConfig;
use crate::model::{Cart, LineItemDraft, Order, PaymentMethod, RestaurantSnapshot};
use crate::order_actor::OrderError;
use crate::session::{Session, SessionError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Checkout validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Static facts about a restaurant that checkout needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantListing {
    pub image: String,
    pub delivery_fee: Option<Decimal>,
}

/// Restaurants by display name.
#[derive(Debug, Clone, Default)]
pub struct RestaurantCatalog {
    listings: HashMap<String, RestaurantListing>,
}

impl RestaurantCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restaurant(
        mut self,
        name: impl Into<String>,
        image: impl Into<String>,
        delivery_fee: Option<Decimal>,
    ) -> Self {
        self.listings.insert(
            name.into(),
            RestaurantListing {
                image: image.into(),
                delivery_fee,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&RestaurantListing> {
        self.listings.get(name)
    }
}

/// Where to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "residence_type", rename_all = "lowercase")]
pub enum DeliveryAddress {
    House {
        city: String,
        block: String,
        road: String,
        house_number: String,
    },
    Apartment {
        city: String,
        block: String,
        road: String,
        building_number: String,
        flat_number: String,
    },
}

impl DeliveryAddress {
    fn validate(&self) -> Result<(), CheckoutError> {
        let fields: Vec<(&str, &String)> = match self {
            DeliveryAddress::House {
                city,
                block,
                road,
                house_number,
            } => vec![
                ("city", city),
                ("block", block),
                ("road", road),
                ("house number", house_number),
            ],
            DeliveryAddress::Apartment {
                city,
                block,
                road,
                building_number,
                flat_number,
            } => vec![
                ("city", city),
                ("block", block),
                ("road", road),
                ("building number", building_number),
                ("flat number", flat_number),
            ],
        };
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CheckoutError::Validation(format!("{name} is required"))),
            None => Ok(()),
        }
    }
}

impl Display for DeliveryAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryAddress::House {
                city,
                block,
                road,
                house_number,
            } => write!(f, "House {house_number}, Road {road}, Block {block}, {city}"),
            DeliveryAddress::Apartment {
                city,
                block,
                road,
                building_number,
                flat_number,
            } => write!(
                f,
                "Building {building_number}, Flat {flat_number}, Road {road}, Block {block}, {city}"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address: DeliveryAddress,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl CheckoutRequest {
    /// The stored address line, with notes appended as ` - {notes}`.
    pub fn address_line(&self) -> String {
        match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => format!("{} - {}", self.address, notes),
            _ => self.address.to_string(),
        }
    }
}

/// Amounts shown on the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutQuote {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

pub struct CheckoutService {
    backend: Arc<dyn OrderBackend>,
    catalog: RestaurantCatalog,
    default_delivery_fee: Decimal,
}

impl CheckoutService {
    pub fn new(backend: Arc<dyn OrderBackend>, catalog: RestaurantCatalog, config: &EngineConfig) -> Self {
        Self {
            backend,
            catalog,
            default_delivery_fee: config.default_delivery_fee,
        }
    }

    pub fn delivery_fee(&self, restaurant: &str) -> Decimal {
        self.catalog
            .get(restaurant)
            .and_then(|listing| listing.delivery_fee)
            .unwrap_or(self.default_delivery_fee)
    }

    pub fn quote(&self, cart: &Cart) -> CheckoutQuote {
        let subtotal = cart.subtotal();
        let delivery_fee = cart
            .current_restaurant()
            .map_or(self.default_delivery_fee, |name| self.delivery_fee(name));
        CheckoutQuote {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }

    /// Places the cart as one order and clears the cart.
    ///
    /// # Errors
    /// - [`CheckoutError::Validation`] for an empty cart or incomplete address.
    /// - [`CheckoutError::Session`] when the session has ended.
    /// - [`CheckoutError::Order`] when the backend refused or failed the write.
    #[instrument(skip_all, fields(user_id = %session.user_id()))]
    pub async fn place_order(
        &self,
        session: &Session,
        cart: &mut Cart,
        request: &CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        session.require_active()?;
        let Some(restaurant_name) = cart.current_restaurant() else {
            return Err(CheckoutError::Validation("your cart is empty".into()));
        };
        request.address.validate()?;

        let image = self
            .catalog
            .get(restaurant_name)
            .map(|listing| listing.image.clone())
            .unwrap_or_default();
        let quote = self.quote(cart);
        let new_order = NewOrder {
            restaurant: RestaurantSnapshot::from_name(restaurant_name, image),
            items: cart.items().iter().map(LineItemDraft::from).collect(),
            total: quote.total,
            delivery_address: request.address_line(),
            payment_method: request.payment_method,
        };

        match self.backend.create_order(session, new_order).await {
            Ok(order) => {
                cart.clear();
                info!(order_id = %order.id, total = %order.total, "Checkout complete");
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed, cart kept");
                Err(e.into())
            }
        }
    }
}
