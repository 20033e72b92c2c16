// src/config/config.rs
use crate::types::{BackendKind, HardwareProfile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Session configuration shared by the dispatcher and the stats loops
///
/// Created from the persisted session file on a continuing session, or
/// synthesized with [`SessionConfig::new_session`] on first run. Only the
/// apply-configuration procedure rewrites it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the pool statistics service
    pub api_endpoint: String,

    /// Wallet address that receives the mining rewards
    #[serde(default)]
    pub address: String,

    /// Identifier of the selected pool (empty until first configuration)
    #[serde(default)]
    pub pool_id: String,

    /// Coin ticker, used to list pools
    pub coin_type: String,

    /// Coin algorithm written into the backend configuration
    pub coin_algo: String,

    /// Backend specific algorithm identifier
    #[serde(default)]
    pub backend_algo: String,

    /// Backend specific algorithm variant
    #[serde(default)]
    pub backend_variant: String,

    /// CPU or GPU mining
    #[serde(default)]
    pub hardware_profile: HardwareProfile,

    /// Correlation key sent to the statistics service
    pub session_id: String,

    /// Backend location, present once configuration completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miner: Option<BackendConfig>,
}

/// Everything needed to construct a miner backend instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which driver to use
    pub kind: BackendKind,
    /// Full path of the miner executable
    pub path: PathBuf,
    /// Copied from the session before every construction
    #[serde(default)]
    pub hardware_profile: HardwareProfile,
}

/// Values a brand new session starts from
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    /// Base URL of the pool statistics service
    pub api_endpoint: String,
    /// Default coin ticker
    pub coin_type: String,
    /// Default coin algorithm
    pub coin_algo: String,
    /// Default backend algorithm identifier
    pub backend_algo: String,
    /// Default backend algorithm variant
    pub backend_variant: String,
}

impl SessionConfig {
    /// Synthesizes the configuration of a first-run session
    ///
    /// The hardware profile defaults to CPU and a fresh session identifier is
    /// generated.
    pub fn new_session(defaults: &SessionDefaults) -> Self {
        SessionConfig {
            api_endpoint: defaults.api_endpoint.clone(),
            address: String::new(),
            pool_id: String::new(),
            coin_type: defaults.coin_type.clone(),
            coin_algo: defaults.coin_algo.clone(),
            backend_algo: defaults.backend_algo.clone(),
            backend_variant: defaults.backend_variant.clone(),
            hardware_profile: HardwareProfile::Cpu,
            session_id: new_session_id(),
            miner: None,
        }
    }

    /// Backend configuration with the session's hardware profile applied
    ///
    /// # Returns
    /// `None` until a backend location has been recorded
    pub fn backend_config(&self) -> Option<BackendConfig> {
        self.miner.as_ref().map(|miner| BackendConfig {
            hardware_profile: self.hardware_profile,
            ..miner.clone()
        })
    }
}

/// Generates a random UUID-v4 session identifier
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
