//! Statistics polling module
//!
//! Two loops feed the front-end while the process runs:
//! - the local loop queries the miner backend and emits `miner_stats`
//! - the network loop queries the pool statistics service and emits
//!   `network_stats`
//!
//! The main component is [`StatsPoller`], returned by
//! [`crate::coordinator::Coordinator::spawn_pollers`].
//!

/// Submodule containing the polling loops
///
/// The poller handles:
/// - Scheduling of both loops on tokio intervals
/// - The out-of-cycle network refresh on the first nonzero hashrate
/// - Throttling of the graph update hint
pub mod poller;

// Re-export main components
pub use poller::{GraphThrottle, StatsPoller};
