// src/miner/backend.rs
//! Miner backend capability
//!
//! The coordinator treats a miner as a black box behind [`MinerBackend`].
//! Concrete drivers are chosen by a [`BackendFactory`] keyed on the detected
//! [`BackendKind`].

use crate::config::BackendConfig;
use crate::miner::{xmr_stak::XmrStak, xmrig::Xmrig};
use crate::types::BackendKind;
use crate::utils::error::MinerError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Statistics reported by a running miner
///
/// The coordinator stamps `address` and `update_graph` before forwarding the
/// stats to the UI as a `miner_stats` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinerStats {
    /// Current total hashrate in hashes per second
    pub hashrate: f64,
    /// Shares accepted by the pool
    pub shares_good: u64,
    /// Shares submitted to the pool
    pub shares_total: u64,
    /// Seconds connected to the pool
    pub uptime: u64,
    /// Pool the miner is connected to
    pub pool: String,
    /// Wallet address the miner is paying to
    pub address: String,
    /// Hint for the front-end to append a point to its hashrate graph
    pub update_graph: bool,
}

/// How much of the machine the miner may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingConfig {
    /// Number of mining threads
    pub threads: u16,
    /// Maximum CPU usage in percent
    pub max_usage: u8,
}

/// Parameters written into the backend's own configuration files
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRunConfig {
    /// Pool `host:port` to mine against
    pub endpoint: String,
    /// Wallet address
    pub address: String,
    /// Coin algorithm
    pub coin_algo: String,
    /// Backend specific algorithm identifier
    pub backend_algo: String,
    /// Backend specific algorithm variant
    pub backend_variant: String,
    /// Thread count and CPU cap
    pub processing: ProcessingConfig,
}

/// Capability interface implemented by every miner driver
///
/// Process control and stats queries talk to an external process or its HTTP
/// API and are therefore asynchronous. Implementations must make `stop` a
/// no-op when the process is not running.
pub trait MinerBackend: Send + Sync {
    /// Human readable driver name
    fn name(&self) -> &str;

    /// Launches the miner process
    fn start(&self) -> BoxFuture<'_, Result<(), MinerError>>;

    /// Terminates the miner process
    fn stop(&self) -> BoxFuture<'_, Result<(), MinerError>>;

    /// Queries the running miner for its current statistics
    ///
    /// A successful call refreshes the cached processing configuration.
    fn stats(&self) -> BoxFuture<'_, Result<MinerStats, MinerError>>;

    /// Processing configuration as last written or observed
    fn processing_config(&self) -> ProcessingConfig;

    /// Writes the miner's on-disk configuration
    ///
    /// # Errors
    /// Returns `MinerError` if the configuration files cannot be written
    fn write_config(&self, config: &BackendRunConfig) -> Result<(), MinerError>;
}

/// Constructs backend instances from a [`BackendConfig`]
pub trait BackendFactory: Send + Sync {
    /// Creates a new, stopped backend instance
    ///
    /// # Errors
    /// Returns `MinerError` if the driver rejects the configuration
    fn create(&self, config: &BackendConfig) -> Result<Arc<dyn MinerBackend>, MinerError>;
}

/// Factory for the bundled drivers
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBackendFactory;

impl BackendFactory for DefaultBackendFactory {
    fn create(&self, config: &BackendConfig) -> Result<Arc<dyn MinerBackend>, MinerError> {
        log::debug!(
            "Creating {} backend for {}",
            config.kind,
            config.path.display()
        );
        match config.kind {
            BackendKind::Xmrig => Ok(Arc::new(Xmrig::new(config.clone())?)),
            BackendKind::XmrStak => Ok(Arc::new(XmrStak::new(config.clone())?)),
        }
    }
}
