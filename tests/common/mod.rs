// tests/common/mod.rs
//! Shared fixtures: in-memory backend, pool service and session store

#![allow(dead_code)]

use bloc_miner_control::config::{BackendConfig, ConfigStore, SessionDefaults};
use bloc_miner_control::miner::{BackendRunConfig, ProcessingConfig};
use bloc_miner_control::network::NetworkStats;
use bloc_miner_control::{
    BackendFactory, BackendKind, Coordinator, HardwareProfile, MinerBackend, MinerError,
    MinerStats, PoolApi, PoolDescriptor, Services, SessionConfig, Settings, UiEvent, UiHandle,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::json;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tokio::sync::mpsc::UnboundedReceiver;

/// Backend that records calls and replays scripted hashrates
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<&'static str>>,
    pub written: Mutex<Vec<BackendRunConfig>>,
    pub hashrates: Mutex<VecDeque<f64>>,
    pub start_error: Option<String>,
    pub stop_error: Option<String>,
    pub write_error: Option<String>,
}

impl MockBackend {
    pub fn with_hashrates(hashrates: &[f64]) -> Self {
        MockBackend {
            hashrates: Mutex::new(hashrates.iter().copied().collect()),
            ..MockBackend::default()
        }
    }

    pub fn failing_stop(message: &str) -> Self {
        MockBackend {
            stop_error: Some(message.to_string()),
            ..MockBackend::default()
        }
    }

    pub fn failing_start(message: &str) -> Self {
        MockBackend {
            start_error: Some(message.to_string()),
            ..MockBackend::default()
        }
    }

    pub fn failing_write(message: &str) -> Self {
        MockBackend {
            write_error: Some(message.to_string()),
            ..MockBackend::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<BackendRunConfig> {
        self.written.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MinerBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn start(&self) -> BoxFuture<'_, Result<(), MinerError>> {
        async move {
            self.record("start");
            match &self.start_error {
                Some(message) => Err(MinerError::Backend(message.clone())),
                None => Ok(()),
            }
        }
        .boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), MinerError>> {
        async move {
            self.record("stop");
            match &self.stop_error {
                Some(message) => Err(MinerError::Backend(message.clone())),
                None => Ok(()),
            }
        }
        .boxed()
    }

    fn stats(&self) -> BoxFuture<'_, Result<MinerStats, MinerError>> {
        async move {
            self.record("stats");
            let hashrate = self.hashrates.lock().unwrap().pop_front().unwrap_or(0.0);
            Ok(MinerStats {
                hashrate,
                pool: "p1:1111".into(),
                ..MinerStats::default()
            })
        }
        .boxed()
    }

    fn processing_config(&self) -> ProcessingConfig {
        ProcessingConfig {
            threads: 4,
            max_usage: 80,
        }
    }

    fn write_config(&self, config: &BackendRunConfig) -> Result<(), MinerError> {
        if let Some(message) = &self.write_error {
            return Err(MinerError::Backend(message.clone()));
        }
        self.written.lock().unwrap().push(config.clone());
        Ok(())
    }
}

/// Factory handing out the same mock backend every time
pub struct MockFactory {
    pub backend: Arc<MockBackend>,
    pub created: Mutex<Vec<BackendConfig>>,
    pub fail_create: AtomicBool,
}

impl BackendFactory for MockFactory {
    fn create(&self, config: &BackendConfig) -> Result<Arc<dyn MinerBackend>, MinerError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(MinerError::Backend(format!(
                "cannot use {}",
                config.path.display()
            )));
        }
        self.created.lock().unwrap().push(config.clone());
        Ok(self.backend.clone())
    }
}

/// Pool statistics service answering from memory
#[derive(Default)]
pub struct MockPoolApi {
    pub pools: Vec<PoolDescriptor>,
    pub fail_list: bool,
    pub list_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub stats_hashrates: Mutex<Vec<f64>>,
}

impl MockPoolApi {
    pub fn with_pools(count: usize) -> Self {
        MockPoolApi {
            pools: (1..=count).map(pool).collect(),
            ..MockPoolApi::default()
        }
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }
}

impl PoolApi for MockPoolApi {
    fn list_pools<'a>(
        &'a self,
        _coin_type: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PoolDescriptor>, MinerError>> {
        async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(MinerError::Api("service unavailable".into()));
            }
            Ok(self.pools.clone())
        }
        .boxed()
    }

    fn pool<'a>(&'a self, pool_id: &'a str) -> BoxFuture<'a, Result<PoolDescriptor, MinerError>> {
        async move {
            self.pools
                .iter()
                .find(|pool| pool.id == pool_id)
                .cloned()
                .ok_or_else(|| MinerError::Api(format!("unknown pool {}", pool_id)))
        }
        .boxed()
    }

    fn network_stats<'a>(
        &'a self,
        _pool_id: &'a str,
        hashrate: f64,
        _session_id: &'a str,
    ) -> BoxFuture<'a, Result<NetworkStats, MinerError>> {
        async move {
            self.stats_calls.fetch_add(1, Ordering::SeqCst);
            self.stats_hashrates.lock().unwrap().push(hashrate);
            Ok(NetworkStats {
                network_hashrate: 1_000_000.0,
                difficulty: 5_000_000.0,
                pool_hashrate: 20_000.0,
                estimated_earnings: hashrate / 1000.0,
                ..NetworkStats::default()
            })
        }
        .boxed()
    }
}

/// Session store keeping every saved snapshot
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Vec<SessionConfig>>,
    pub fail_save: AtomicBool,
}

impl ConfigStore for MemoryStore {
    fn save(&self, config: &SessionConfig) -> Result<(), MinerError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(MinerError::ConfigError("read-only volume".into()));
        }
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}

/// Pool `pool<n>` with endpoints `p<n>:1111` (CPU), `p<n>:2222` (GPU)
/// and `p<n>:3333` (generic)
pub fn pool(n: usize) -> PoolDescriptor {
    serde_json::from_value(json!({
        "id": format!("pool{}", n),
        "name": format!("Pool {}", n),
        "config": format!("p{}:3333", n),
        "mining_ports": {"cpu": format!("p{}:1111", n), "gpu": format!("p{}:2222", n)},
        "fee": 1
    }))
    .unwrap()
}

pub fn defaults() -> SessionDefaults {
    SessionDefaults {
        api_endpoint: "http://api.local/".into(),
        coin_type: "BLOC".into(),
        coin_algo: "cryptonight_haven".into(),
        backend_algo: "cryptonight-heavy".into(),
        backend_variant: "xhv".into(),
    }
}

/// A session that already completed configuration against `pool1`
pub fn configured_session(dir: &Path) -> SessionConfig {
    let mut config = SessionConfig::new_session(&defaults());
    config.address = "addr1".into();
    config.pool_id = "pool1".into();
    config.miner = Some(BackendConfig {
        kind: BackendKind::Xmrig,
        path: dir.join("miner").join("xmrig"),
        hardware_profile: HardwareProfile::Cpu,
    });
    config
}

pub struct Harness {
    pub coordinator: Coordinator,
    pub events: UnboundedReceiver<UiEvent>,
    pub backend: Arc<MockBackend>,
    pub factory: Arc<MockFactory>,
    pub pools: Arc<MockPoolApi>,
    pub store: Arc<MemoryStore>,
    pub dir: TempDir,
}

impl Harness {
    /// Builds a coordinator over mocks in a fresh installation directory
    ///
    /// `persisted` receives the installation directory and returns the
    /// session to continue, if any.
    pub fn new(
        persisted: impl FnOnce(&Path) -> Option<SessionConfig>,
        backend: MockBackend,
        pools: MockPoolApi,
    ) -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("miner")).unwrap();
        fs::write(dir.path().join("miner").join("xmrig"), b"").unwrap();

        let mut settings = Settings::new(dir.path(), defaults());
        settings.render_delay = Duration::ZERO;

        let backend = Arc::new(backend);
        let factory = Arc::new(MockFactory {
            backend: backend.clone(),
            created: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
        });
        let pools = Arc::new(pools);
        let store = Arc::new(MemoryStore::default());
        let services = Services {
            pools: pools.clone(),
            backends: factory.clone(),
            store: store.clone(),
        };

        let (ui, events) = UiHandle::channel();
        let coordinator = Coordinator::new(settings, persisted(dir.path()), services, ui).unwrap();

        Harness {
            coordinator,
            events,
            backend,
            factory,
            pools,
            store,
            dir,
        }
    }

    /// First-run installation
    pub fn fresh(backend: MockBackend, pools: MockPoolApi) -> Self {
        Harness::new(|_| None, backend, pools)
    }

    /// Continuing session, already configured against `pool1`
    pub fn configured(backend: MockBackend, pools: MockPoolApi) -> Self {
        Harness::new(|dir| Some(configured_session(dir)), backend, pools)
    }

    /// Events emitted so far
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Asserts the error went through notify-then-terminate exactly once
pub fn assert_fatal(harness: &mut Harness, err: &MinerError, fragment: &str) {
    assert!(err.is_fatal(), "{} is not fatal", err);
    let messages = fatal_messages(&harness.drain_events());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains(fragment), "{:?}", messages);
    assert!(*harness.coordinator.termination().borrow());
}

pub fn fatal_messages(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            UiEvent::FatalError { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
