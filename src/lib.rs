//! Bloc Miner Control - control plane of a desktop cryptocurrency miner
//!
//! This crate coordinates a bundled third-party miner (xmrig or xmr-stak) with
//! an external front-end shell. It provides:
//! - A command dispatcher answering the front-end over JSON lines
//! - The miner lifecycle: configure, start, stop
//! - Periodic local and network statistics pushed to the front-end
//! - Notify-then-terminate handling of fatal conditions

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Session state, command dispatch and the miner lifecycle
pub mod coordinator;

/// Miner backend capability and the bundled drivers
pub mod miner;

/// Pool statistics service client and pool list rendering
pub mod network;

/// Local and network statistics polling
pub mod stats;

/// Front-end events and transport
pub mod ui;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::{SessionConfig, Settings};
pub use coordinator::{Coordinator, LifecycleState, Services};
pub use miner::{BackendFactory, DefaultBackendFactory, MinerBackend, MinerStats};
pub use network::{NetworkStats, PoolApi, PoolClient, PoolDescriptor};
pub use stats::StatsPoller;
pub use types::{BackendKind, HardwareProfile};
pub use ui::{UiEvent, UiHandle};
pub use utils::{MinerError, init_logging};
