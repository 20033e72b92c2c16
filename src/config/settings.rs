// src/config/settings.rs
use crate::config::config::SessionDefaults;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the directory holding the bundled miner executable
pub const MINER_DIR: &str = "miner";

/// Name of the directory holding static front-end resources
pub const RESOURCES_DIR: &str = "resources";

/// Default session file name inside the working directory
pub const SESSION_FILE: &str = "config.toml";

/// Interval of the local mining stats loop
pub const MINER_STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Interval of the pool/network stats loop
pub const NETWORK_STATS_INTERVAL: Duration = Duration::from_secs(20);

/// Minimum time between two `update_graph` hints
pub const GRAPH_UPDATE_PERIOD: Duration = Duration::from_secs(60);

/// Upper bound on how long a fatal message waits for the UI acknowledgement
pub const FATAL_GRACE_PERIOD: Duration = Duration::from_secs(15);

/// Pause before applying a configuration so the UI shows its progress message
pub const RENDER_DELAY: Duration = Duration::from_secs(3);

/// Runtime settings of the coordinator
///
/// Built once from the command line; never persisted.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Installation directory; the miner and resources live below it
    pub working_dir: PathBuf,
    /// Where the session configuration is persisted
    pub session_file: PathBuf,
    /// Values a first-run session starts from
    pub defaults: SessionDefaults,
    /// Local mining stats loop interval
    pub miner_stats_interval: Duration,
    /// Network stats loop interval
    pub network_stats_interval: Duration,
    /// Throttle for the `update_graph` hint
    pub graph_update_period: Duration,
    /// Bounded wait for the UI to acknowledge a fatal message
    pub fatal_grace_period: Duration,
    /// Delay inserted before apply-configuration
    pub render_delay: Duration,
}

impl Settings {
    /// Creates settings with the default intervals
    ///
    /// # Arguments
    /// * `working_dir` - Installation directory
    /// * `defaults` - First-run session values
    pub fn new(working_dir: impl Into<PathBuf>, defaults: SessionDefaults) -> Self {
        let working_dir = working_dir.into();
        Settings {
            session_file: working_dir.join(SESSION_FILE),
            working_dir,
            defaults,
            miner_stats_interval: MINER_STATS_INTERVAL,
            network_stats_interval: NETWORK_STATS_INTERVAL,
            graph_update_period: GRAPH_UPDATE_PERIOD,
            fatal_grace_period: FATAL_GRACE_PERIOD,
            render_delay: RENDER_DELAY,
        }
    }

    /// Directory scanned for the miner executable
    pub fn miner_dir(&self) -> PathBuf {
        self.working_dir.join(MINER_DIR)
    }

    /// Path of a file in the resources directory
    pub fn resource(&self, name: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(RESOURCES_DIR).join(name)
    }
}
