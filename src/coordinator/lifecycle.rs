// src/coordinator/lifecycle.rs
//! Start, stop and apply-configuration transitions
//!
//! All three hold the lifecycle gate for their whole duration. The session
//! lock is only taken for short reads and writes; backend and pool API calls
//! run on cloned handles with the lock released.

use crate::config::BackendConfig;
use crate::coordinator::Coordinator;
use crate::coordinator::payload::{ConfigurePayload, decode};
use crate::miner::{BackendRunConfig, ProcessingConfig, detect_backend_kind};
use crate::utils::error::MinerError;

const CONFIGURE_FAILED: &str = "Unable to configure miner";

impl Coordinator {
    /// Starts the configured backend
    ///
    /// # Errors
    /// * `MinerError::InvalidTransition` - No backend was configured yet
    /// * `MinerError::Fatal` - The backend failed to start
    pub async fn start(&self) -> Result<(), MinerError> {
        let _gate = self.inner.lifecycle.lock().await;

        let backend = {
            let session = self.inner.session.lock().await;
            if session.running {
                log::debug!("Miner already running, ignoring start");
                return Ok(());
            }
            session.backend.clone()
        };
        let Some(backend) = backend else {
            return Err(MinerError::InvalidTransition(
                "the miner must be configured before it can start".into(),
            ));
        };

        if let Err(e) = backend.start().await {
            return Err(MinerError::fatal(
                &format!(
                    "Unable to start '{}' miner. Please check that you can run the miner from your installation directory",
                    backend.name()
                ),
                e,
            ));
        }

        self.inner.session.lock().await.running = true;
        log::info!("Started '{}' miner", backend.name());
        Ok(())
    }

    /// Stops the backend, if one exists
    ///
    /// A failure is shown to the user and returned; the process keeps running.
    pub async fn stop(&self) -> Result<(), MinerError> {
        let _gate = self.inner.lifecycle.lock().await;

        let Some(backend) = self.inner.session.lock().await.backend.clone() else {
            log::debug!("No miner configured, nothing to stop");
            return Ok(());
        };

        if let Err(e) = backend.stop().await {
            log::error!("Unable to stop '{}' miner: {}", backend.name(), e);
            self.inner.supervisor.report(format!(
                "Unable to stop miner. Please close the miner and open it again. The error was '{}'",
                e
            ));
            return Err(e);
        }

        self.inner.session.lock().await.running = false;
        log::info!("Stopped '{}' miner", backend.name());
        Ok(())
    }

    /// Applies a `save-configuration` payload
    ///
    /// Detects the bundled miner, builds a new backend instance, resolves the
    /// pool endpoint for the hardware profile, writes the backend's own
    /// configuration and persists the session.
    ///
    /// # Errors
    /// * `MinerError::InvalidTransition` - The miner is running
    /// * `MinerError::Fatal` - Any step after that failed
    pub async fn apply_configuration(&self, payload: &[u8]) -> Result<(), MinerError> {
        let _gate = self.inner.lifecycle.lock().await;

        if self.inner.session.lock().await.running {
            return Err(MinerError::InvalidTransition(
                "stop the miner before changing its configuration".into(),
            ));
        }

        log::info!("Configuring miner");
        let request: ConfigurePayload = decode(
            payload,
            "Unable to configure miner. Please check that your configuration is valid",
        )?;

        let profile = {
            let mut session = self.inner.session.lock().await;
            request.apply_to(&mut session.config);
            session.config.hardware_profile
        };

        let miner_dir = self.inner.settings.miner_dir();
        log::debug!("Determining miner type in {}", miner_dir.display());
        let (kind, path) = detect_backend_kind(&miner_dir).map_err(|e| {
            MinerError::fatal(
                "Unable to configure miner. Could not determine the miner type",
                e,
            )
        })?;

        let backend_config = BackendConfig {
            kind,
            path,
            hardware_profile: profile,
        };
        let backend = self
            .inner
            .services
            .backends
            .create(&backend_config)
            .map_err(|e| MinerError::fatal(CONFIGURE_FAILED, e))?;

        let pool_id = {
            let mut session = self.inner.session.lock().await;
            session.config.miner = Some(backend_config);
            session.replace_backend(backend.clone());
            session.config.pool_id.clone()
        };

        log::debug!("Fetching pool {}", pool_id);
        let pool = self.inner.services.pools.pool(&pool_id).await.map_err(|e| {
            MinerError::fatal(
                "Unable to configure miner. Please check that you are connected to the internet",
                e,
            )
        })?;

        let (run, snapshot) = {
            let session = self.inner.session.lock().await;
            let run = BackendRunConfig {
                endpoint: pool.endpoint_for(profile).to_string(),
                address: session.config.address.clone(),
                coin_algo: session.config.coin_algo.clone(),
                backend_algo: session.config.backend_algo.clone(),
                backend_variant: session.config.backend_variant.clone(),
                processing: ProcessingConfig {
                    threads: request.resolved_threads(),
                    max_usage: request.resolved_max_usage(),
                },
            };
            (run, session.config.clone())
        };

        log::debug!("Writing {} configuration for {}", kind, run.endpoint);
        backend.write_config(&run).map_err(|e| {
            MinerError::fatal(
                "Unable to configure miner. Please check that you can write to the miner's installation path",
                e,
            )
        })?;

        self.inner.services.store.save(&snapshot).map_err(|e| {
            MinerError::fatal(
                "Unable to save the miner configuration. Please check that you can write to the installation path",
                e,
            )
        })?;

        log::info!("Miner configured with {}", kind);
        Ok(())
    }
}
