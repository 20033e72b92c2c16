// src/network/mod.rs
//! Network communication components
//!
//! This module handles all interactions with the remote pool statistics
//! service:
//! - `PoolClient`: HTTP client for pool lists, pool details and network stats
//! - `PoolTemplate`: rendering of pool descriptors for the first-run page

/// Pool statistics client implementation
///
/// Defines the [`PoolApi`] trait the coordinator depends on and its HTTP
/// implementation.
pub mod pool;

/// Pool list rendering
pub mod template;

// Re-export main components for cleaner imports
pub use pool::{MiningPorts, NetworkStats, PoolApi, PoolClient, PoolDescriptor};
pub use template::PoolTemplate;
