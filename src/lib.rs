//! # FoodGo Orders
//!
//! > **The order lifecycle engine behind the FoodGo client.**
//!
//! A placed order moves `confirmed → preparing → out_for_delivery → delivered` on a
//! fixed schedule measured from its creation time, and can be cancelled during the
//! first twenty seconds. This crate owns that lifecycle, the cart that feeds it, and
//! the progress view that renders it.
//!
//! ## 🏗️ Design
//!
//! ### Records live in an actor
//! Orders are owned by a generic [`ResourceActor`](framework::ResourceActor). It
//! processes one request at a time, so status writes are serialised without locks, and
//! it publishes every successful write on a per-record `watch` channel.
//!
//! ### Time is derived, never stored
//! Every deadline comes from `(created_at, status, now)`
//! (see [`tracking::schedule`]). A tracker that attaches late, or restarts, computes
//! the same answer and writes any overdue step at once.
//!
//! ### Writes are best-effort
//! A failed auto-advance is logged and retried on the next observation. Explicit
//! actions (placing and cancelling) return their errors to the caller.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Separates record rules from the plumbing (channels, message loop, change feed).
//! - **Key items**: [`ActorEntity`](framework::ActorEntity), [`ResourceActor`](framework::ResourceActor).
//!
//! ### 2. The Records ([`model`], [`order_actor`])
//! - **Role**: [`Order`](model::Order) and its transition rules; the client-side [`Cart`](model::Cart).
//!
//! ### 3. The Interface ([`clients`], [`session`])
//! - **Role**: [`OrderBackend`](clients::OrderBackend) is the port the engine talks to;
//!   [`OrderClient`](clients::OrderClient) implements it over the actor.
//!
//! ### 4. The Lifecycle ([`tracking`], [`checkout`])
//! - **Role**: per-order [`OrderTracker`](tracking::OrderTracker), cancellation gate,
//!   progress projection, notifications, and cart-to-order checkout.
//!
//! ### 5. The Orchestrator ([`runtime`], [`config`])
//! - **Role**: [`OrderSystem`](runtime::OrderSystem) wires everything from an
//!   [`EngineConfig`](config::EngineConfig) and shuts it down.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod checkout;
pub mod clients;
pub mod config;
pub mod framework;
pub mod model;
pub mod order_actor;
pub mod runtime;
pub mod session;
pub mod tracking;
