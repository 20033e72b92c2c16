// src/config/mod.rs
//! Configuration management for the miner control plane
//!
//! This module handles all configuration-related functionality including:
//! - The persisted session configuration (address, pool, coin, hardware)
//! - Loading and saving the session as TOML
//! - Runtime settings derived from the command line
//!
//! A missing session file means first run; the coordinator then synthesizes a
//! new session from [`SessionDefaults`].

/// Core configuration implementation
///
/// Contains the [`SessionConfig`] struct and related types that describe
/// the current mining session.
pub mod config;

/// Runtime settings and their defaults
pub mod settings;

/// Persistence of the session configuration
pub mod store;

// Re-export key items for easy access
pub use config::{BackendConfig, SessionConfig, SessionDefaults};
pub use settings::Settings;
pub use store::{ConfigStore, FileConfigStore};
