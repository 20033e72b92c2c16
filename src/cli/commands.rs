// src/cli/commands.rs
use crate::config::{SessionDefaults, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Bloc miner control - coordinates a bundled miner with a desktop front-end
#[derive(Parser, Debug)]
#[command(name = "bloc-miner-control")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (serve the front-end or inspect the installation)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Serve the front-end over stdin/stdout until it closes
    Run(RunOptions),

    /// Print the kind and path of the bundled miner
    Detect(DetectOptions),
}

/// Options for serving the front-end
#[derive(Parser, Debug)]
pub struct RunOptions {
    /// Installation directory holding `miner/` and `resources/`
    #[arg(short, long, default_value = ".")]
    pub working_dir: PathBuf,

    /// Base URL of the pool statistics service
    #[arg(short, long)]
    pub api_endpoint: String,

    /// Session file (defaults to `config.toml` in the working directory)
    #[arg(short, long)]
    pub session_file: Option<PathBuf>,

    /// Coin of a new session
    #[arg(long, default_value = "BLOC")]
    pub coin_type: String,

    /// Coin algorithm of a new session
    #[arg(long, default_value = "cryptonight_haven")]
    pub coin_algo: String,

    /// Backend algorithm of a new session
    #[arg(long, default_value = "cryptonight-heavy")]
    pub backend_algo: String,

    /// Backend algorithm variant of a new session
    #[arg(long, default_value = "xhv")]
    pub backend_variant: String,

    /// Seconds between two local stats queries
    #[arg(long, default_value_t = 5)]
    pub miner_stats_interval: u64,

    /// Seconds between two network stats queries
    #[arg(long, default_value_t = 20)]
    pub network_stats_interval: u64,

    /// Minimum seconds between two graph update hints
    #[arg(long, default_value_t = 60)]
    pub graph_update_period: u64,

    /// Seconds a fatal message waits for the front-end's acknowledgement
    #[arg(long, default_value_t = 15)]
    pub fatal_grace_period: u64,

    /// Milliseconds the front-end gets to render before a configuration is applied
    #[arg(long, default_value_t = 3000)]
    pub render_delay: u64,

    /// Write debug level logs to `debug.log` in the working directory
    #[arg(short, long)]
    pub debug: bool,
}

impl RunOptions {
    /// Runtime settings described by these options
    pub fn settings(&self) -> Settings {
        let defaults = SessionDefaults {
            api_endpoint: self.api_endpoint.clone(),
            coin_type: self.coin_type.clone(),
            coin_algo: self.coin_algo.clone(),
            backend_algo: self.backend_algo.clone(),
            backend_variant: self.backend_variant.clone(),
        };
        let mut settings = Settings::new(&self.working_dir, defaults);
        if let Some(session_file) = &self.session_file {
            settings.session_file = session_file.clone();
        }
        settings.miner_stats_interval = Duration::from_secs(self.miner_stats_interval.max(1));
        settings.network_stats_interval = Duration::from_secs(self.network_stats_interval.max(1));
        settings.graph_update_period = Duration::from_secs(self.graph_update_period);
        settings.fatal_grace_period = Duration::from_secs(self.fatal_grace_period);
        settings.render_delay = Duration::from_millis(self.render_delay);
        settings
    }
}

/// Options for inspecting the installation
#[derive(Parser, Debug)]
pub struct DetectOptions {
    /// Installation directory holding `miner/`
    #[arg(short, long, default_value = ".")]
    pub working_dir: PathBuf,
}
