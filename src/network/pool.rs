// src/network/pool.rs

//! Pool statistics client implementation
//!
//! Talks to the remote pool/network statistics service over HTTP. The
//! coordinator only depends on the [`PoolApi`] trait; [`PoolClient`] is the
//! production implementation.
use crate::types::HardwareProfile;
use crate::utils::error::MinerError;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Mining endpoints of a pool, per hardware profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningPorts {
    /// `host:port` tuned for CPU miners
    #[serde(default)]
    pub cpu: String,
    /// `host:port` tuned for GPU miners
    #[serde(default)]
    pub gpu: String,
}

/// Remote description of a mining pool
///
/// Fields the coordinator does not interpret are kept in `display` so the
/// pool template can reference them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    /// Pool identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Generic `host:port`, used when the hardware profile is unknown
    #[serde(default)]
    pub config: String,
    /// Per hardware profile endpoints
    #[serde(default)]
    pub mining_ports: MiningPorts,
    /// Remaining display metadata (fee, hashrate, miners, ...)
    #[serde(flatten)]
    pub display: Map<String, Value>,
}

impl PoolDescriptor {
    /// Endpoint the miner should connect to for `profile`
    ///
    /// CPU and GPU profiles use their dedicated endpoint; any other profile
    /// falls back to the generic `config` endpoint.
    pub fn endpoint_for(&self, profile: HardwareProfile) -> &str {
        match profile {
            HardwareProfile::Cpu => &self.mining_ports.cpu,
            HardwareProfile::Gpu => &self.mining_ports.gpu,
            HardwareProfile::Other(_) => &self.config,
        }
    }
}

/// Network, pool and earnings statistics for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Hashrate of the whole network
    #[serde(default)]
    pub network_hashrate: f64,
    /// Current network difficulty
    #[serde(default)]
    pub difficulty: f64,
    /// Hashrate of the selected pool
    #[serde(default)]
    pub pool_hashrate: f64,
    /// Expected coins per day at the reported hashrate
    #[serde(default)]
    pub estimated_earnings: f64,
    /// Everything else the service reports (prices, last block, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Remote pool statistics service
pub trait PoolApi: Send + Sync {
    /// Lists the recommended pools for a coin
    fn list_pools<'a>(
        &'a self,
        coin_type: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PoolDescriptor>, MinerError>>;

    /// Fetches a single pool by identifier
    fn pool<'a>(&'a self, pool_id: &'a str) -> BoxFuture<'a, Result<PoolDescriptor, MinerError>>;

    /// Fetches network and earnings statistics
    ///
    /// # Arguments
    /// * `pool_id` - Selected pool
    /// * `hashrate` - Last observed local hashrate, for the earnings estimate
    /// * `session_id` - Correlation key of this installation
    fn network_stats<'a>(
        &'a self,
        pool_id: &'a str,
        hashrate: f64,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<NetworkStats, MinerError>>;
}

/// HTTP client for the pool statistics service
///
/// Endpoint layout, relative to the base URL:
/// - `GET pools?coin=<coin>` - array of [`PoolDescriptor`]
/// - `GET pool/<id>` - one [`PoolDescriptor`]
/// - `GET stats?pool=<id>&hashrate=<h/s>&mid=<session>` - [`NetworkStats`]
pub struct PoolClient {
    /// Base URL of the service
    endpoint: Url,
    /// HTTP client for making requests
    client: Client,
}

impl PoolClient {
    /// Creates a new PoolClient for the given base URL
    ///
    /// # Errors
    /// Returns `MinerError::UrlError` if the endpoint is not a valid URL, or
    /// `MinerError::ConfigError` if it cannot carry a path
    pub fn new(endpoint: &str) -> Result<Self, MinerError> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(MinerError::ConfigError(format!(
                "API endpoint '{}' cannot be used as a base URL",
                endpoint
            )));
        }

        Ok(PoolClient {
            endpoint,
            client: Client::new(),
        })
    }

    /// Builds `<endpoint>/<segments...>`, percent-encoding each segment
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, MinerError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| MinerError::ConfigError(format!("Invalid API endpoint '{}'", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Performs a GET request and decodes the JSON body
    ///
    /// # Errors
    /// Returns `MinerError` if:
    /// - The service is unreachable
    /// - It answers with a non-success status
    /// - The body is not the expected JSON
    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, MinerError> {
        let url = self.url(segments)?;
        log::debug!("GET {}", url);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MinerError::Api(format!("{} returned {}", url, status)));
        }

        Ok(response.json().await?)
    }
}

impl PoolApi for PoolClient {
    fn list_pools<'a>(
        &'a self,
        coin_type: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PoolDescriptor>, MinerError>> {
        async move {
            let query = [("coin", coin_type.to_string())];
            self.get(&["pools"], &query).await
        }
        .boxed()
    }

    fn pool<'a>(&'a self, pool_id: &'a str) -> BoxFuture<'a, Result<PoolDescriptor, MinerError>> {
        async move { self.get(&["pool", pool_id], &[]).await }.boxed()
    }

    fn network_stats<'a>(
        &'a self,
        pool_id: &'a str,
        hashrate: f64,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<NetworkStats, MinerError>> {
        async move {
            let query = [
                ("pool", pool_id.to_string()),
                ("hashrate", hashrate.to_string()),
                ("mid", session_id.to_string()),
            ];
            self.get(&["stats"], &query).await
        }
        .boxed()
    }
}

/// Accepts pool identifiers sent either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected pool id, found {}",
            other
        ))),
    }
}
