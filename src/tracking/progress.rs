//! Progress projector: status to percentage, labels and timeline.
//!
//! Every function is total. A status the engine does not recognise renders as
//! `confirmed`.

use crate::model::OrderStatus;
use serde::Serialize;

/// Progress bar value for a status.
pub fn progress_percent(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Confirmed | OrderStatus::Unrecognized => 25,
        OrderStatus::Preparing => 50,
        OrderStatus::OutForDelivery => 75,
        OrderStatus::Delivered => 100,
        OrderStatus::Cancelled => 0,
    }
}

/// Short label shown on the status badge.
pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirmed | OrderStatus::Unrecognized => "Order Confirmed",
        OrderStatus::Preparing => "Preparing",
        OrderStatus::OutForDelivery => "Out for Delivery",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
    }
}

pub fn status_description(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirmed | OrderStatus::Unrecognized => "Your order has been confirmed",
        OrderStatus::Preparing => "Restaurant is preparing your food",
        OrderStatus::OutForDelivery => "Driver is on the way",
        OrderStatus::Delivered => "Order delivered successfully",
        OrderStatus::Cancelled => "Order has been cancelled",
    }
}

/// Caption under the tracking header.
pub fn header_caption(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Delivered => "Delivered!",
        OrderStatus::Cancelled => "Cancelled",
        _ => "Estimated 25-35 min",
    }
}

/// One row of the tracking timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub current: bool,
}

/// The timeline rows for `status`.
///
/// Forward statuses list the whole sequence with every step up to the current one
/// completed. A cancelled order shows only the cancelled step.
pub fn timeline(status: OrderStatus) -> Vec<TimelineStep> {
    if status == OrderStatus::Cancelled {
        return vec![TimelineStep {
            status,
            label: status_label(status),
            description: status_description(status),
            completed: true,
            current: true,
        }];
    }
    let current = status.forward_index().unwrap_or(0);
    OrderStatus::FORWARD
        .iter()
        .enumerate()
        .map(|(index, step)| TimelineStep {
            status: *step,
            label: status_label(*step),
            description: status_description(*step),
            completed: index <= current,
            current: index == current,
        })
        .collect()
}
