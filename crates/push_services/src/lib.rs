//! # Push Services
//!
//! This crate keeps renters' push subscriptions and delivers booking
//! decisions to them. Delivery is best effort over a background queue:
//! the deciding request never waits on it, and endpoints that answer with
//! a permanent failure are pruned from the subscription table.

/// Subscription persistence and endpoint delivery
mod service;
pub use service::*;

/// Background queue wiring the booking engine to push delivery
mod dispatcher;
pub use dispatcher::*;

/// Types for push subscriptions and delivery
mod types;
pub use types::*;
