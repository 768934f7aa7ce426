//! # Auth Services
//!
//! This crate verifies bearer tokens issued by the external identity
//! provider and exposes the authenticated user to request handlers.
//! Token issuance itself happens outside this application; only the
//! shared-secret verification side lives here.

/// JWT token verification.
pub mod jwt;
/// Middleware for request authentication.
pub mod middleware;
/// Types and structures used in authentication.
pub mod types;
