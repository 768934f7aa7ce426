//! # Postgres
//!
//! This crate provides a client for the rental marketplace application to interact with a PostgreSQL database.

/// Database client for the rental marketplace application.
pub mod database;
