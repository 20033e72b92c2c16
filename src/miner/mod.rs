// src/miner/mod.rs
//! Miner backend drivers
//!
//! This module contains everything that touches the external miner:
//! - The [`MinerBackend`] capability and its factory
//! - Classification of the bundled executable
//! - Process supervision
//! - Drivers for xmrig and xmr-stak

/// Backend capability trait, stats types and the driver factory
pub mod backend;

/// Classification of the executable in the miner directory
pub mod detect;

/// Child process handling shared by the drivers
pub mod process;

/// HTTP summary report shared by the drivers
mod summary;

/// XMRig driver
pub mod xmrig;

/// xmr-stak driver
pub mod xmr_stak;

// Re-export main components for cleaner imports
pub use self::backend::{
    BackendFactory, BackendRunConfig, DefaultBackendFactory, MinerBackend, MinerStats,
    ProcessingConfig,
};
pub use self::detect::detect_backend_kind;
pub use self::process::MinerProcess;
