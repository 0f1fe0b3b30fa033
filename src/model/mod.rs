//! Pure data structures. [`Order`] implements [`ActorEntity`](crate::framework::ActorEntity)
//! in [`order_actor`](crate::order_actor); [`Cart`] stays on the client side.

pub mod cart;
pub mod order;

pub use cart::*;
pub use order::*;
