//! # Booking Engine
//!
//! This crate holds the booking core of the rental marketplace: the
//! inclusive date-range type, the per-vehicle availability ledger, and the
//! booking lifecycle state machine with its conflict-safe commit discipline.
//! Everything reads committed state through an injected `PgPool`; the
//! occupied-day view is recomputed from the booking set on demand rather
//! than maintained as a second source of truth.

/// Types for bookings and the engine's error taxonomy
mod booking_types;
pub use booking_types::*;

/// Inclusive day-granularity date ranges
mod date_range;
pub use date_range::*;

/// Per-vehicle availability authority and conflict checks
mod ledger;
pub use ledger::*;

/// Booking state machine and decision commit protocol
mod lifecycle;
pub use lifecycle::*;
