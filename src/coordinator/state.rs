// src/coordinator/state.rs
use crate::config::SessionConfig;
use crate::miner::MinerBackend;
use std::fmt;
use std::sync::Arc;

/// Where the miner stands in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No backend instance exists yet (first run)
    Unconfigured,
    /// A backend instance exists but is not mining
    Configured,
    /// The backend process was started
    Running,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Unconfigured => write!(f, "unconfigured"),
            LifecycleState::Configured => write!(f, "configured"),
            LifecycleState::Running => write!(f, "running"),
        }
    }
}

/// Mutable session state guarded by the coordinator's session lock
pub(crate) struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) backend: Option<Arc<dyn MinerBackend>>,
    pub(crate) running: bool,
    pub(crate) last_hashrate: f64,
    pub(crate) hashrate_seen: bool,
}

impl Session {
    pub(crate) fn new(config: SessionConfig, backend: Option<Arc<dyn MinerBackend>>) -> Self {
        Session {
            config,
            backend,
            running: false,
            last_hashrate: 0.0,
            hashrate_seen: false,
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        match (&self.backend, self.running) {
            (None, _) => LifecycleState::Unconfigured,
            (Some(_), false) => LifecycleState::Configured,
            (Some(_), true) => LifecycleState::Running,
        }
    }

    /// Installs a freshly built backend and resets the running statistics
    pub(crate) fn replace_backend(&mut self, backend: Arc<dyn MinerBackend>) {
        self.backend = Some(backend);
        self.running = false;
        self.last_hashrate = 0.0;
        self.hashrate_seen = false;
    }

    /// Whether `backend` is still the installed instance
    pub(crate) fn is_current(&self, backend: &Arc<dyn MinerBackend>) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, backend))
    }
}
