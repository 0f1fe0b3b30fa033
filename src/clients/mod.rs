//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod actor_client;
pub mod backend;
pub mod order_client;

pub use actor_client::*;
pub use backend::*;
pub use order_client::*;
