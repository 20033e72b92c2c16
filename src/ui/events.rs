// src/ui/events.rs
//! Outbound events pushed to the front-end

use crate::miner::MinerStats;
use crate::network::NetworkStats;
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Event name for pool/network statistics
pub const NETWORK_STATS: &str = "network_stats";

/// Event name for local miner statistics
pub const MINER_STATS: &str = "miner_stats";

/// Event name for error messages shown to the user
pub const FATAL_ERROR: &str = "fatal_error";

/// Named event sent to the UI outside of a command reply
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Pool, network and earnings statistics
    NetworkStats(NetworkStats),
    /// Statistics of the local miner
    MinerStats(MinerStats),
    /// Error message the UI must display
    FatalError {
        /// Human readable message
        message: String,
    },
}

impl UiEvent {
    /// Transport name of the event
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::NetworkStats(_) => NETWORK_STATS,
            UiEvent::MinerStats(_) => MINER_STATS,
            UiEvent::FatalError { .. } => FATAL_ERROR,
        }
    }

    /// JSON payload of the event
    pub fn data(&self) -> Result<Value, serde_json::Error> {
        match self {
            UiEvent::NetworkStats(stats) => serde_json::to_value(stats),
            UiEvent::MinerStats(stats) => serde_json::to_value(stats),
            UiEvent::FatalError { message } => Ok(json!({ "message": message })),
        }
    }
}

/// Sending side of the UI event channel
///
/// Cheap to clone; the coordinator, the stats loops and the supervisor each
/// hold one.
#[derive(Debug, Clone)]
pub struct UiHandle {
    sender: UnboundedSender<UiEvent>,
}

impl UiHandle {
    /// Creates a handle and the receiver the transport drains
    pub fn channel() -> (UiHandle, UnboundedReceiver<UiEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (UiHandle { sender }, receiver)
    }

    /// Queues an event for the front-end
    ///
    /// A closed channel means the UI is gone; the event is dropped and logged.
    pub fn emit(&self, event: UiEvent) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Unable to send {} to front-end: channel closed", e.0.name());
        }
    }
}
