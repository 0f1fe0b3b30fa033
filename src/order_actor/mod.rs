//! Order-specific resource logic and entity implementation.
//!
//! The actor is the order backend: it owns every [`Order`](crate::model::Order),
//! serialises status writes and publishes each successful write on the record's
//! change channel.

pub mod entity;
pub mod error;

pub use entity::OrderContext;
pub use error::*;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::Order;

/// Creates a new Order actor and its generic client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
