// src/coordinator/dispatcher.rs
//! Front-end command routing

use crate::coordinator::Coordinator;
use crate::coordinator::payload::{FrontendConfig, PoolListRequest, decode};
use crate::miner::detect_backend_kind;
use crate::network::PoolTemplate;
use crate::utils::error::MinerError;
use crate::utils::identity::current_identity;
use serde_json::Value;
use std::fs;
use std::str::FromStr;
use tokio::time;

/// Pool template file in the resources directory
pub const POOL_TEMPLATE_FILE: &str = "pool.html";

/// Static content file in the resources directory
pub const CONTENT_FILE: &str = "content.json";

/// Commands understood by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Local OS user identity
    GetIdentity,
    /// Directory holding the miner executable
    GetBackendPath,
    /// Kind of the bundled miner
    GetBackendKind,
    /// Rendered pool list for a coin
    GetPoolList,
    /// Thread count and CPU cap of the backend
    GetProcessingConfig,
    /// Static content shown by the front-end
    GetContent,
    /// Apply and persist a new configuration
    SaveConfiguration,
    /// User-editable part of the session
    GetConfig,
    /// Start mining
    Start,
    /// Stop mining
    Stop,
    /// The UI rendered the last fatal message
    AcknowledgeFatal,
}

impl Command {
    /// All commands, in documentation order
    pub const ALL: [Command; 11] = [
        Command::GetIdentity,
        Command::GetBackendPath,
        Command::GetBackendKind,
        Command::GetPoolList,
        Command::GetProcessingConfig,
        Command::GetContent,
        Command::SaveConfiguration,
        Command::GetConfig,
        Command::Start,
        Command::Stop,
        Command::AcknowledgeFatal,
    ];

    /// Wire name of the command
    pub fn name(self) -> &'static str {
        match self {
            Command::GetIdentity => "get-identity",
            Command::GetBackendPath => "get-backend-path",
            Command::GetBackendKind => "get-backend-kind",
            Command::GetPoolList => "get-pool-list",
            Command::GetProcessingConfig => "get-processing-config",
            Command::GetContent => "get-content",
            Command::SaveConfiguration => "save-configuration",
            Command::GetConfig => "get-config",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::AcknowledgeFatal => "acknowledge-fatal",
        }
    }
}

impl FromStr for Command {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or_else(|| MinerError::UnknownCommand(s.to_string()))
    }
}

impl Coordinator {
    /// Handles one front-end command
    ///
    /// Fatal errors are routed through the supervisor (message to the UI,
    /// acknowledgement or grace period, termination request) before being
    /// returned to the caller.
    pub async fn handle(&self, name: &str, payload: &[u8]) -> Result<Value, MinerError> {
        let result = self.dispatch(name, payload).await;
        if let Err(e) = &result {
            if e.is_fatal() {
                self.inner
                    .supervisor
                    .notify_then_terminate(&e.to_string())
                    .await;
            } else {
                log::warn!("Command '{}' failed: {}", name, e);
            }
        }
        result
    }

    /// Routes a command to its handler without fatal-error supervision
    ///
    /// # Errors
    /// `MinerError::UnknownCommand` for names not in [`Command`], otherwise
    /// whatever the handler returns
    pub async fn dispatch(&self, name: &str, payload: &[u8]) -> Result<Value, MinerError> {
        log::debug!("Received command '{}' from front-end", name);
        let command: Command = name.parse()?;

        match command {
            Command::GetIdentity => {
                let identity = tokio::task::spawn_blocking(current_identity).await?;
                Ok(Value::String(identity))
            }
            Command::GetBackendPath => Ok(Value::String(
                self.inner.settings.miner_dir().display().to_string(),
            )),
            Command::GetBackendKind => Ok(Value::String(self.backend_kind())),
            Command::GetPoolList => self.pool_list(payload).await.map(Value::String),
            Command::GetProcessingConfig => self.processing_config().await.map(Value::String),
            Command::GetContent => Ok(Value::String(self.content())),
            Command::SaveConfiguration => {
                time::sleep(self.inner.settings.render_delay).await;
                self.apply_configuration(payload).await?;
                Ok(Value::String("Ok".into()))
            }
            Command::GetConfig => self.frontend_config().await.map(Value::String),
            Command::Start => self.start().await.map(|()| Value::Null),
            Command::Stop => self.stop().await.map(|()| Value::Null),
            Command::AcknowledgeFatal => {
                self.inner.supervisor.acknowledge();
                Ok(Value::Null)
            }
        }
    }

    fn backend_kind(&self) -> String {
        match detect_backend_kind(&self.inner.settings.miner_dir()) {
            Ok((kind, _)) => kind.to_string(),
            Err(e) => {
                log::debug!("Unable to determine miner type: {}", e);
                String::new()
            }
        }
    }

    async fn pool_list(&self, payload: &[u8]) -> Result<String, MinerError> {
        let request: PoolListRequest = decode(payload, "Unable to read the pool list request")?;
        self.inner.session.lock().await.config.coin_type = request.coin_type.clone();

        log::debug!("Fetching pools for {}", request.coin_type);
        let pools = self
            .inner
            .services
            .pools
            .list_pools(&request.coin_type)
            .await
            .map_err(|e| {
                MinerError::fatal(
                    "Unable to fetch pool list from API. Please check that you are connected to the internet and try again",
                    e,
                )
            })?;

        let template = PoolTemplate::load(&self.inner.settings.resource(POOL_TEMPLATE_FILE))
            .map_err(|e| MinerError::fatal("Unable to load the pool template", e))?;
        template.render_list(&pools)
    }

    async fn processing_config(&self) -> Result<String, MinerError> {
        let Some(backend) = self.inner.session.lock().await.backend.clone() else {
            self.inner.supervisor.report(
                "Unable to fetch miner config. Please check that your miner is working and running.",
            );
            return Ok(String::new());
        };

        // Refreshes the cached thread count
        if let Err(e) = backend.stats().await {
            log::debug!("Unable to refresh miner stats: {}", e);
        }
        Ok(serde_json::to_string(&backend.processing_config())?)
    }

    fn content(&self) -> String {
        let path = self.inner.settings.resource(CONTENT_FILE);
        let loaded = fs::read_to_string(&path)
            .map_err(MinerError::from)
            .and_then(|raw| {
                serde_json::from_str::<Value>(&raw)?;
                Ok(raw)
            });
        match loaded {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Unable to load {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    async fn frontend_config(&self) -> Result<String, MinerError> {
        let config = FrontendConfig::from(&self.inner.session.lock().await.config);
        Ok(serde_json::to_string(&config)?)
    }
}
