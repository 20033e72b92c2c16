// src/coordinator/payload.rs
//! Command payloads exchanged with the front-end

use crate::config::SessionConfig;
use crate::types::HardwareProfile;
use crate::utils::error::MinerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Payload of `save-configuration`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePayload {
    /// Wallet address
    #[serde(default)]
    pub address: String,
    /// Selected pool identifier
    #[serde(default)]
    pub pool: String,
    /// Coin ticker
    #[serde(default)]
    pub coin_type: String,
    /// Coin algorithm
    #[serde(default)]
    pub coin_algo: String,
    /// Backend algorithm identifier
    #[serde(default, alias = "xmrigAlgo")]
    pub backend_algo: String,
    /// Backend algorithm variant
    #[serde(default, alias = "xmrigVariant")]
    pub backend_variant: String,
    /// CPU (1) or GPU (2) mining
    #[serde(default)]
    pub hardware_type: HardwareProfile,
    /// Mining threads, 0 for all logical CPUs
    #[serde(default)]
    pub threads: u16,
    /// CPU usage cap in percent, 0 for no cap
    #[serde(default, rename = "maxCPU")]
    pub max_cpu: u8,
}

impl ConfigurePayload {
    /// Copies the user's choices into the session configuration
    pub fn apply_to(&self, config: &mut SessionConfig) {
        config.address = self.address.clone();
        config.pool_id = self.pool.clone();
        config.hardware_profile = self.hardware_type;
        config.coin_type = self.coin_type.clone();
        config.coin_algo = self.coin_algo.clone();
        config.backend_algo = self.backend_algo.clone();
        config.backend_variant = self.backend_variant.clone();
    }

    /// Thread count with 0 resolved to the number of logical CPUs
    pub fn resolved_threads(&self) -> u16 {
        match self.threads {
            0 => u16::try_from(num_cpus::get()).unwrap_or(u16::MAX),
            threads => threads,
        }
    }

    /// CPU cap with 0 resolved to 100 percent
    pub fn resolved_max_usage(&self) -> u8 {
        match self.max_cpu {
            0 => 100,
            max => max.min(100),
        }
    }
}

/// Payload of `get-pool-list`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolListRequest {
    /// Coin whose pools are listed
    pub coin_type: String,
}

/// User-editable subset of the session returned by `get-config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendConfig {
    /// Coin ticker
    pub coin_type: String,
    /// Coin algorithm
    pub coin_algo: String,
    /// Backend algorithm identifier
    pub backend_algo: String,
    /// Backend algorithm variant
    pub backend_variant: String,
    /// CPU (1) or GPU (2) mining
    pub hardware_type: HardwareProfile,
}

impl From<&SessionConfig> for FrontendConfig {
    fn from(config: &SessionConfig) -> Self {
        FrontendConfig {
            coin_type: config.coin_type.clone(),
            coin_algo: config.coin_algo.clone(),
            backend_algo: config.backend_algo.clone(),
            backend_variant: config.backend_variant.clone(),
            hardware_type: config.hardware_profile,
        }
    }
}

/// Decodes a command payload; any failure is fatal
pub(crate) fn decode<T: DeserializeOwned>(payload: &[u8], context: &str) -> Result<T, MinerError> {
    serde_json::from_slice(payload).map_err(|e| MinerError::fatal(context, e))
}
