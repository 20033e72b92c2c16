// src/coordinator/mod.rs
//! Miner control coordinator
//!
//! Owns the session state and ties together:
//! - Command dispatch from the front-end
//! - The miner lifecycle (start, stop, apply-configuration)
//! - Fatal-condition supervision
//!
//! The stats loops in [`crate::stats`] run against the same [`Coordinator`].

/// Command routing and the read-only command handlers
pub mod dispatcher;

/// Start, stop and apply-configuration
pub mod lifecycle;

/// Payloads exchanged with the front-end
pub mod payload;

/// Session state and lifecycle states
pub mod state;

/// Notify-then-terminate handling
pub mod supervisor;

pub use dispatcher::Command;
pub use payload::{ConfigurePayload, FrontendConfig, PoolListRequest};
pub use state::LifecycleState;
pub use supervisor::Supervisor;

use crate::config::{ConfigStore, SessionConfig, Settings};
use crate::miner::BackendFactory;
use crate::network::PoolApi;
use crate::stats::StatsPoller;
use crate::ui::UiHandle;
use crate::utils::error::MinerError;
use state::Session;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// External collaborators of the coordinator
#[derive(Clone)]
pub struct Services {
    /// Remote pool statistics service
    pub pools: Arc<dyn PoolApi>,
    /// Builds backend drivers
    pub backends: Arc<dyn BackendFactory>,
    /// Persists the session configuration
    pub store: Arc<dyn ConfigStore>,
}

/// Shared handle to the control plane
///
/// Cheap to clone; every clone refers to the same session.
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) settings: Settings,
    pub(crate) session: Mutex<Session>,
    pub(crate) lifecycle: Mutex<()>,
    pub(crate) ui: UiHandle,
    pub(crate) services: Services,
    pub(crate) supervisor: Supervisor,
    pub(crate) cancel: watch::Sender<bool>,
}

impl Coordinator {
    /// Creates the coordinator for a continuing or a new session
    ///
    /// # Arguments
    /// * `settings` - Runtime settings
    /// * `persisted` - Loaded session, `None` on first run
    /// * `services` - Pool API, backend factory and config store
    /// * `ui` - Sending side of the UI event channel
    ///
    /// # Errors
    /// Returns `MinerError::ConfigError` if the persisted backend cannot be
    /// constructed (e.g. the executable was removed)
    pub fn new(
        settings: Settings,
        persisted: Option<SessionConfig>,
        services: Services,
        ui: UiHandle,
    ) -> Result<Self, MinerError> {
        let (config, backend) = match persisted {
            Some(config) => {
                log::info!("Continuing session {}", config.session_id);
                let backend = match config.backend_config() {
                    Some(backend_config) => {
                        Some(services.backends.create(&backend_config).map_err(|e| {
                            MinerError::ConfigError(format!(
                                "Unable to use '{}' as miner: {}",
                                backend_config.path.display(),
                                e
                            ))
                        })?)
                    }
                    None => None,
                };
                (config, backend)
            }
            None => {
                let config = SessionConfig::new_session(&settings.defaults);
                log::info!("Starting new session {}", config.session_id);
                (config, None)
            }
        };

        let supervisor = Supervisor::new(ui.clone(), settings.fatal_grace_period);
        let (cancel, _) = watch::channel(false);

        Ok(Coordinator {
            inner: Arc::new(Inner {
                settings,
                session: Mutex::new(Session::new(config, backend)),
                lifecycle: Mutex::new(()),
                ui,
                services,
                supervisor,
                cancel,
            }),
        })
    }

    /// Runtime settings
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Current lifecycle state
    pub async fn lifecycle_state(&self) -> LifecycleState {
        self.inner.session.lock().await.state()
    }

    /// Snapshot of the session configuration
    pub async fn session_config(&self) -> SessionConfig {
        self.inner.session.lock().await.config.clone()
    }

    /// Last hashrate reported by the backend
    pub async fn last_hashrate(&self) -> f64 {
        self.inner.session.lock().await.last_hashrate
    }

    /// Receiver that turns `true` once a fatal condition requested termination
    pub fn termination(&self) -> watch::Receiver<bool> {
        self.inner.supervisor.termination()
    }

    /// Orderly shutdown: stops the backend, then cancels and joins the pollers
    ///
    /// # Errors
    /// Returns the backend's stop error, after the pollers were joined
    pub async fn shutdown(&self, poller: StatsPoller) -> Result<(), MinerError> {
        log::info!("Shutting down");
        let stopped = self.stop().await;
        self.inner.cancel.send_replace(true);
        poller.join().await?;
        stopped
    }
}

/// Resolves once `flag` turns `true` (or its sender is gone)
pub(crate) async fn signalled(flag: &mut watch::Receiver<bool>) {
    let _ = flag.wait_for(|raised| *raised).await;
}
