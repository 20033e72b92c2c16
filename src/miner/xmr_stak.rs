// src/miner/xmr_stak.rs
//! xmr-stak driver
//!
//! xmr-stak reads three JSON-fragment files from its working directory:
//! `config.txt` (general settings and the HTTP API port), `pools.txt` and
//! `cpu.txt` (one entry per mining thread).

use crate::config::BackendConfig;
use crate::miner::backend::{BackendRunConfig, MinerBackend, MinerStats, ProcessingConfig};
use crate::miner::process::MinerProcess;
use crate::miner::summary::fetch_summary;
use crate::types::HardwareProfile;
use crate::utils::error::MinerError;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Port of xmr-stak's HTTP API
pub const XMR_STAK_API_PORT: u16 = 16001;

const CONFIG_FILE: &str = "config.txt";
const POOLS_FILE: &str = "pools.txt";
const CPU_FILE: &str = "cpu.txt";

/// Driver for an xmr-stak executable
pub struct XmrStak {
    config: BackendConfig,
    process: MinerProcess,
    client: Client,
    processing: Mutex<ProcessingConfig>,
}

impl XmrStak {
    /// Creates a driver for the executable at `config.path`
    ///
    /// # Errors
    /// Returns `MinerError::Backend` if the executable does not exist
    pub fn new(config: BackendConfig) -> Result<Self, MinerError> {
        if !config.path.is_file() {
            return Err(MinerError::Backend(format!(
                "xmr-stak executable not found at {}",
                config.path.display()
            )));
        }

        Ok(XmrStak {
            process: MinerProcess::new(&config.path),
            config,
            client: Client::new(),
            processing: Mutex::new(ProcessingConfig::default()),
        })
    }

    fn file(&self, name: &str) -> PathBuf {
        self.config.path.with_file_name(name)
    }

    fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-c", CONFIG_FILE, "-C", POOLS_FILE, "--cpu", CPU_FILE, "--noUAC"]
            .into_iter()
            .map(String::from)
            .collect();
        match self.config.hardware_profile {
            HardwareProfile::Gpu => args.push("--noCPU".into()),
            _ => {
                args.push("--noAMD".into());
                args.push("--noNVIDIA".into());
            }
        }
        args
    }

    fn render_general() -> String {
        format!(
            "\"call_timeout\" : 10,\n\
             \"retry_time\" : 30,\n\
             \"giveup_limit\" : 0,\n\
             \"verbose_level\" : 3,\n\
             \"print_motd\" : false,\n\
             \"h_print_time\" : 60,\n\
             \"aes_override\" : null,\n\
             \"use_slow_memory\" : \"warn\",\n\
             \"tls_secure_algo\" : true,\n\
             \"daemon_mode\" : true,\n\
             \"output_file\" : \"\",\n\
             \"httpd_port\" : {},\n\
             \"http_login\" : \"\",\n\
             \"http_pass\" : \"\",\n\
             \"prefer_ipv4\" : true,\n",
            XMR_STAK_API_PORT
        )
    }

    fn render_pools(run: &BackendRunConfig) -> Result<String, MinerError> {
        let currency = if run.backend_algo.is_empty() {
            &run.coin_algo
        } else {
            &run.backend_algo
        };
        Ok(format!(
            "\"pool_list\" :\n[\n\t{{\"pool_address\" : {}, \"wallet_address\" : {}, \
             \"rig_id\" : \"\", \"pool_password\" : \"x\", \"use_nicehash\" : false, \
             \"use_tls\" : false, \"tls_fingerprint\" : \"\", \"pool_weight\" : 1 }},\n],\n\
             \"currency\" : {},\n",
            serde_json::to_string(&run.endpoint)?,
            serde_json::to_string(&run.address)?,
            serde_json::to_string(currency)?
        ))
    }

    fn render_cpu(threads: u16) -> String {
        let mut out = String::from("\"cpu_threads_conf\" :\n[\n");
        for cpu in 0..threads {
            let _ = writeln!(
                out,
                "\t{{ \"low_power_mode\" : false, \"no_prefetch\" : true, \"asm\" : \"auto\", \"affine_to_cpu\" : {} }},",
                cpu
            );
        }
        out.push_str("],\n");
        out
    }

    fn cache(&self, update: impl FnOnce(&mut ProcessingConfig)) {
        let mut processing = self.processing.lock().unwrap_or_else(|e| e.into_inner());
        update(&mut processing);
    }
}

impl MinerBackend for XmrStak {
    fn name(&self) -> &str {
        "xmr-stak"
    }

    fn start(&self) -> BoxFuture<'_, Result<(), MinerError>> {
        async move { self.process.spawn(&self.args()).await }.boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), MinerError>> {
        self.process.kill().boxed()
    }

    fn stats(&self) -> BoxFuture<'_, Result<MinerStats, MinerError>> {
        async move {
            let url = format!("http://127.0.0.1:{}/api.json", XMR_STAK_API_PORT);
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

    /// xmr-stak has no CPU cap; `max_usage` is only remembered for the UI
    fn write_config(&self, run: &BackendRunConfig) -> Result<(), MinerError> {
        fs::write(self.file(CONFIG_FILE), Self::render_general())?;
        fs::write(self.file(POOLS_FILE), Self::render_pools(run)?)?;
        fs::write(self.file(CPU_FILE), Self::render_cpu(run.processing.threads))?;
        self.cache(|processing| *processing = run.processing);

        log::debug!(
            "Wrote xmr-stak configuration next to {}",
            self.config.path.display()
        );
        Ok(())
    }
}
