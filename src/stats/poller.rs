// src/stats/poller.rs
use crate::coordinator::{Coordinator, signalled};
use crate::ui::UiEvent;
use crate::utils::error::MinerError;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Throttles the `update_graph` hint of `miner_stats` events
///
/// The hint is raised at most once per `period`; the first period starts when
/// the throttle is created.
#[derive(Debug, Clone)]
pub struct GraphThrottle {
    period: Duration,
    last_update: Instant,
}

impl GraphThrottle {
    /// Creates a throttle whose first period starts at `now`
    pub fn new(period: Duration, now: Instant) -> Self {
        GraphThrottle {
            period,
            last_update: now,
        }
    }

    /// Whether the hint should be set at `now`; restarts the period if so
    pub fn should_update(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_update) >= self.period {
            self.last_update = now;
            true
        } else {
            false
        }
    }
}

/// Handles of the two running stats loops
pub struct StatsPoller {
    miner: JoinHandle<()>,
    network: JoinHandle<()>,
}

impl StatsPoller {
    /// Waits for both loops to finish
    ///
    /// The loops only end once the coordinator signalled cancellation, see
    /// [`Coordinator::shutdown`].
    pub async fn join(self) -> Result<(), MinerError> {
        self.miner.await?;
        self.network.await?;
        Ok(())
    }
}

impl Coordinator {
    /// Spawns the local and network stats loops
    pub fn spawn_pollers(&self) -> StatsPoller {
        log::info!("Start capturing mining stats");
        StatsPoller {
            miner: tokio::spawn(self.clone().miner_stats_loop()),
            network: tokio::spawn(self.clone().network_stats_loop()),
        }
    }

    async fn miner_stats_loop(self) {
        let period = self.inner.settings.miner_stats_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut throttle =
            GraphThrottle::new(self.inner.settings.graph_update_period, Instant::now());
        let mut cancel = self.inner.cancel.subscribe();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh_miner_stats(&mut throttle).await,
                _ = signalled(&mut cancel) => break,
            }
        }
        log::debug!("Mining stats loop stopped");
    }

    async fn network_stats_loop(self) {
        let mut ticker = time::interval(self.inner.settings.network_stats_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel = self.inner.cancel.subscribe();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh_network_stats().await,
                _ = signalled(&mut cancel) => break,
            }
        }
        log::debug!("Network stats loop stopped");
    }

    /// One tick of the local stats loop
    ///
    /// The first nonzero hashrate of a session triggers an immediate network
    /// stats refresh so earnings show up without waiting for the next cycle.
    pub async fn refresh_miner_stats(&self, throttle: &mut GraphThrottle) {
        let Some(backend) = self.inner.session.lock().await.backend.clone() else {
            log::debug!("No miner configured yet");
            return;
        };

        let mut stats = match backend.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                log::debug!("Unable to get mining stats, miner not available yet?: {}", e);
                return;
            }
        };

        let first_hashrate = {
            let mut session = self.inner.session.lock().await;
            if !session.is_current(&backend) {
                log::debug!("Miner was reconfigured while fetching stats");
                return;
            }
            let first = !session.hashrate_seen && stats.hashrate > 0.0;
            session.hashrate_seen |= first;
            session.last_hashrate = stats.hashrate;
            stats.address = session.config.address.clone();
            first
        };

        if first_hashrate {
            self.refresh_network_stats().await;
        }

        stats.update_graph = throttle.should_update(Instant::now());
        log::debug!("Mining stats: {:.2} H/s", stats.hashrate);
        self.inner.ui.emit(UiEvent::MinerStats(stats));
    }

    /// One tick of the network stats loop
    pub async fn refresh_network_stats(&self) {
        let (pool_id, hashrate, session_id) = {
            let session = self.inner.session.lock().await;
            (
                session.config.pool_id.clone(),
                session.last_hashrate,
                session.config.session_id.clone(),
            )
        };

        if pool_id.is_empty() {
            log::warn!("No pool selected yet, skipping network stats");
            return;
        }

        log::debug!("Fetching network stats (hashrate {:.2} H/s)", hashrate);
        match self
            .inner
            .services
            .pools
            .network_stats(&pool_id, hashrate, &session_id)
            .await
        {
            Ok(stats) => self.inner.ui.emit(UiEvent::NetworkStats(stats)),
            Err(e) => log::warn!("Unable to get network stats: {}", e),
        }
    }
}
