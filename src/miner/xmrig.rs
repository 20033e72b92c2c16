// src/miner/xmrig.rs
//! XMRig driver
//!
//! Configures xmrig through a `config.json` next to the executable and reads
//! its statistics from the built-in HTTP API.

use crate::config::BackendConfig;
use crate::miner::backend::{BackendRunConfig, MinerBackend, MinerStats, ProcessingConfig};
use crate::miner::process::MinerProcess;
use crate::miner::summary::fetch_summary;
use crate::types::HardwareProfile;
use crate::utils::error::MinerError;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Port of xmrig's HTTP API
pub const XMRIG_API_PORT: u16 = 16000;

/// Name of the generated configuration file
pub const XMRIG_CONFIG_FILE: &str = "config.json";

/// Driver for an xmrig executable
pub struct Xmrig {
    /// Location and hardware profile
    config: BackendConfig,
    /// The miner process
    process: MinerProcess,
    /// Client for the stats API
    client: Client,
    /// Last written or observed processing configuration
    processing: Mutex<ProcessingConfig>,
}

impl Xmrig {
    /// Creates a driver for the executable at `config.path`
    ///
    /// # Errors
    /// Returns `MinerError::Backend` if the executable does not exist
    pub fn new(config: BackendConfig) -> Result<Self, MinerError> {
        if !config.path.is_file() {
            return Err(MinerError::Backend(format!(
                "xmrig executable not found at {}",
                config.path.display()
            )));
        }

        Ok(Xmrig {
            process: MinerProcess::new(&config.path),
            config,
            client: Client::new(),
            processing: Mutex::new(ProcessingConfig::default()),
        })
    }

    fn config_path(&self) -> PathBuf {
        self.config.path.with_file_name(XMRIG_CONFIG_FILE)
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![format!("--config={}", self.config_path().display())];
        if self.config.hardware_profile == HardwareProfile::Gpu {
            args.push("--no-cpu".into());
            args.push("--opencl".into());
        }
        args
    }

    fn render_config(run: &BackendRunConfig) -> serde_json::Value {
        let mut pool = json!({
            "url": run.endpoint,
            "user": run.address,
            "pass": "x",
            "keepalive": true,
            "nicehash": false,
        });
        if !run.backend_variant.is_empty() {
            pool["variant"] = json!(run.backend_variant);
        }

        let algo = if run.backend_algo.is_empty() {
            &run.coin_algo
        } else {
            &run.backend_algo
        };

        json!({
            "algo": algo,
            "api": {
                "port": XMRIG_API_PORT,
                "access-token": null,
                "worker-id": null,
                "restricted": true,
            },
            "background": false,
            "colors": false,
            "donate-level": 1,
            "threads": run.processing.threads,
            "max-cpu-usage": run.processing.max_usage,
            "print-time": 60,
            "retries": 5,
            "retry-pause": 5,
            "pools": [pool],
        })
    }

    fn cache(&self, update: impl FnOnce(&mut ProcessingConfig)) {
        let mut processing = self.processing.lock().unwrap_or_else(|e| e.into_inner());
        update(&mut processing);
    }
}

impl MinerBackend for Xmrig {
    fn name(&self) -> &str {
        "xmrig"
    }

    fn start(&self) -> BoxFuture<'_, Result<(), MinerError>> {
        async move { self.process.spawn(&self.args()).await }.boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), MinerError>> {
        self.process.kill().boxed()
    }

    fn stats(&self) -> BoxFuture<'_, Result<MinerStats, MinerError>> {
        async move {
            let url = format!("http://127.0.0.1:{}/1/summary", XMRIG_API_PORT);
            let summary = fetch_summary(&self.client, &url).await?;
            let threads = summary.thread_count();
            if threads > 0 {
                self.cache(|processing| {
                    processing.threads = u16::try_from(threads).unwrap_or(u16::MAX)
                });
            }
            Ok(summary.into_stats())
        }
        .boxed()
    }

    fn processing_config(&self) -> ProcessingConfig {
        *self.processing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(&self, run: &BackendRunConfig) -> Result<(), MinerError> {
        let path = self.config_path();
        let contents = serde_json::to_string_pretty(&Self::render_config(run))?;
        fs::write(&path, contents)?;
        self.cache(|processing| *processing = run.processing);

        log::debug!("Wrote xmrig configuration to {}", path.display());
        Ok(())
    }
}
