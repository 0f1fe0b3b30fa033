//! Runtime orchestration and lifecycle management.
//!
//! - [`OrderSystem`] - starts the Order actor, wires checkout and trackers, shuts down
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure
//!
//! ## Dependency Injection via Context
//!
//! The Order actor receives its [`OrderContext`](crate::order_actor::OrderContext)
//! (the clock) when `run()` is called, not at construction. Tests hand in a paused
//! tokio clock the same way.
//!
//! ## Graceful Shutdown
//!
//! 1. **Detach trackers** - each owns a client clone and a background task
//! 2. **Drop all clients** - closes the sender side of the request channel
//! 3. **Actor detects closure** - `receiver.recv()` returns `None`
//! 4. **Await completion** - wait for the actor task to finish

pub mod order_system;
pub mod tracing;

pub use self::order_system::OrderSystem;
pub use self::tracing::setup_tracing;
