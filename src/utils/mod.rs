// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! This module contains shared utilities used throughout the control plane,
//! including error handling, logging infrastructure and local user lookup.

/// Error types and handling utilities
///
/// Contains the [`MinerError`] enum which defines all possible error conditions
/// for the control plane, along with conversion implementations.
pub mod error;

/// Logging configuration and utilities
///
/// Provides logging initialization and configuration for the application,
/// including formatting and output destinations.
pub mod logging;

/// Local OS user identity lookup
pub mod identity;

// Re-export for easier access
pub use error::MinerError;
pub use identity::current_identity;
pub use logging::{init_debug_logging, init_logging};
