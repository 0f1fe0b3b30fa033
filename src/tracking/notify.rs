//! Terminal-transition notifications.
//!
//! The relay collaborator takes a `{ user_name, order_name }` JSON body. For a delivery
//! `order_name` is the item summary, for a cancellation a fixed sentence.
//! Notifications are fire-and-forget: failures are logged by the caller and never
//! reach the order lifecycle.

use crate::model::OrderLineItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

pub const CANCELLED_MESSAGE: &str = "Your last order has been cancelled";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification relay closed")]
    RelayClosed,

    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Body sent to the notification relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub user_name: String,
    pub order_name: String,
}

impl RelayPayload {
    pub fn delivered(user_name: &str, item_summary: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            order_name: item_summary.to_string(),
        }
    }

    pub fn cancelled(user_name: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            order_name: CANCELLED_MESSAGE.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, NotifyError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `"2 Burger (no onions), 1 Fries"`.
pub fn item_summary(items: &[OrderLineItem]) -> String {
    items
        .iter()
        .map(|item| match item.special_instructions.as_deref() {
            Some(note) if !note.trim().is_empty() => {
                format!("{} {} ({})", item.quantity, item.item_name, note)
            }
            _ => format!("{} {}", item.quantity, item.item_name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outbound notification port.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify_delivered(&self, user_name: &str, item_summary: &str) -> Result<(), NotifyError>;

    async fn notify_cancelled(&self, user_name: &str) -> Result<(), NotifyError>;
}

/// Logs each payload. The default when no relay is wired.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl OrderNotifier for TracingNotifier {
    async fn notify_delivered(&self, user_name: &str, item_summary: &str) -> Result<(), NotifyError> {
        let body = RelayPayload::delivered(user_name, item_summary).to_json()?;
        info!(%body, "Delivery notification");
        Ok(())
    }

    async fn notify_cancelled(&self, user_name: &str) -> Result<(), NotifyError> {
        let body = RelayPayload::cancelled(user_name).to_json()?;
        info!(%body, "Cancellation notification");
        Ok(())
    }
}

/// Forwards payloads to an in-process receiver, typically the relay's sender task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<RelayPayload>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RelayPayload>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, payload: RelayPayload) -> Result<(), NotifyError> {
        self.sender
            .send(payload)
            .map_err(|_| NotifyError::RelayClosed)
    }
}

#[async_trait]
impl OrderNotifier for ChannelNotifier {
    async fn notify_delivered(&self, user_name: &str, item_summary: &str) -> Result<(), NotifyError> {
        self.send(RelayPayload::delivered(user_name, item_summary))
    }

    async fn notify_cancelled(&self, user_name: &str) -> Result<(), NotifyError> {
        self.send(RelayPayload::cancelled(user_name))
    }
}
