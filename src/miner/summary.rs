// src/miner/summary.rs
//! HTTP summary report shared by the bundled miners
//!
//! Both xmrig (`/1/summary`) and xmr-stak (`/api.json`) answer with the same
//! JSON shape for the fields the front-end needs.

use crate::miner::backend::MinerStats;
use crate::utils::error::MinerError;
use reqwest::Client;
use serde::Deserialize;

/// Subset of the miner's summary report
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Summary {
    #[serde(default)]
    hashrate: HashrateReport,
    #[serde(default)]
    results: ResultsReport,
    #[serde(default)]
    connection: ConnectionReport,
}

#[derive(Debug, Default, Deserialize)]
struct HashrateReport {
    /// 10s / 60s / 15m averages, `null` while not yet measured
    #[serde(default)]
    total: Vec<Option<f64>>,
    /// Same averages per mining thread
    #[serde(default)]
    threads: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultsReport {
    #[serde(default)]
    shares_good: u64,
    #[serde(default)]
    shares_total: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectionReport {
    #[serde(default)]
    pool: String,
    #[serde(default)]
    uptime: u64,
}

impl Summary {
    /// Number of mining threads the miner reports
    pub(crate) fn thread_count(&self) -> usize {
        self.hashrate.threads.len()
    }

    /// Converts the report into UI stats; the shortest average wins
    pub(crate) fn into_stats(self) -> MinerStats {
        MinerStats {
            hashrate: self.hashrate.total.first().copied().flatten().unwrap_or(0.0),
            shares_good: self.results.shares_good,
            shares_total: self.results.shares_total,
            uptime: self.connection.uptime,
            pool: self.connection.pool,
            ..MinerStats::default()
        }
    }
}

/// Fetches and decodes a summary report
///
/// # Errors
/// Returns `MinerError` if the API is unreachable (typically while the miner
/// is still starting), answers with an error status or sends invalid JSON
pub(crate) async fn fetch_summary(client: &Client, url: &str) -> Result<Summary, MinerError> {
    let summary = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(summary)
}
