//! Error types for the Order actor.

use crate::model::OrderStatus;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order data provided is invalid, or the caller may not place it.
    #[error("Order validation error: {0}")]
    Validation(String),

    /// The record refused a status transition.
    #[error("Order cannot move from {from} to {to}")]
    Conflict { from: OrderStatus, to: OrderStatus },

    /// The order record could not be reached.
    #[error("Order backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::BackendUnavailable(msg)
    }
}
