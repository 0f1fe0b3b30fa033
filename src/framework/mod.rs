//! Generic actor framework for backend-owned records.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that record types implement to be owned by an actor
//! - [`ResourceActor`] - Generic actor that stores records and serialises writes
//! - [`ResourceClient`] - Cloneable handle that sends requests to the actor
//! - [`FrameworkError`] - Plumbing errors (actor closed, record not found)
//!
//! Every record gets a `watch` channel; [`ResourceClient::subscribe`] is the change
//! notifier the order tracker listens on.
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning a real actor.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
