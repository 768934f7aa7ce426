//! # Media Store
//!
//! This crate fronts the external image store. It sniffs uploads by magic
//! bytes before anything leaves the process, and hands accepted bytes to
//! the store, which answers with the URL the stored image is served from.

/// Image content-type detection
mod sniff;
pub use sniff::*;

/// Image store trait and implementations
mod service;
pub use service::*;

/// Types for media operations
mod types;
pub use types::*;
