//! # Web Handlers for the Rental Marketplace
//!
//! This crate provides the web handlers for the rental marketplace
//! application.

/// Types for vehicle listing API endpoints
mod vehicle_types;
pub use vehicle_types::*;

/// Service for vehicle listing database operations
mod vehicle_service;
pub use vehicle_service::*;

/// Handlers for vehicle listing API endpoints
mod vehicle_handlers;
pub use vehicle_handlers::*;

/// Handlers for booking API endpoints
mod booking_handlers;
pub use booking_handlers::*;

/// Handlers for push subscription API endpoints
mod push_handlers;
pub use push_handlers::*;
