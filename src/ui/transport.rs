// src/ui/transport.rs
//! JSON-lines transport between the front-end shell and the coordinator
//!
//! Inbound, one command per line:
//! `{"id": 1, "name": "get-config", "payload": {...}}`
//!
//! Outbound, one message per line, either a reply
//! `{"id": 1, "result": ...}` / `{"id": 1, "error": "..."}`
//! or an event `{"event": "miner_stats", "data": {...}}`.

use crate::coordinator::{Coordinator, signalled};
use crate::ui::events::UiEvent;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

/// Command envelope received from the front-end
#[derive(Debug, Clone, Deserialize)]
pub struct MessageIn {
    /// Correlation id echoed in the reply
    #[serde(default)]
    pub id: Value,
    /// Command name
    pub name: String,
    /// Command specific payload
    #[serde(default)]
    pub payload: Option<Value>,
}

impl MessageIn {
    /// Raw payload bytes handed to the dispatcher
    pub fn payload_bytes(&self) -> Result<Vec<u8>, MinerError> {
        match &self.payload {
            Some(payload) => Ok(serde_json::to_vec(payload)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Message written to the front-end
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageOut {
    /// Successful command reply
    Reply {
        /// Correlation id of the command
        id: Value,
        /// Command result
        result: Value,
    },
    /// Failed command reply
    Failure {
        /// Correlation id of the command
        id: Value,
        /// Error description
        error: String,
    },
    /// Out-of-band event
    Event {
        /// Event name
        event: &'static str,
        /// Event payload
        data: Value,
    },
}

impl MessageOut {
    fn from_event(event: &UiEvent) -> Option<Self> {
        match event.data() {
            Ok(data) => Some(MessageOut::Event {
                event: event.name(),
                data,
            }),
            Err(e) => {
                log::error!("Unable to encode {} event: {}", event.name(), e);
                None
            }
        }
    }
}

/// Serves the front-end until its input closes or a fatal condition
/// requests termination
///
/// Every command runs in its own task so a slow command (or a fatal message
/// waiting for its acknowledgement) never blocks the next inbound line.
///
/// # Arguments
/// * `coordinator` - Handles the commands
/// * `events` - Receiver of the coordinator's [`crate::ui::UiHandle`]
/// * `input` - Line oriented command source (stdin in production)
/// * `output` - Destination of replies and events (stdout in production)
///
/// # Errors
/// Returns `MinerError` if reading the input fails
pub async fn serve<R, W>(
    coordinator: Coordinator,
    events: UnboundedReceiver<UiEvent>,
    input: R,
    output: W,
) -> Result<(), MinerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (replies, outbound) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(output, outbound, events));

    let mut termination = coordinator.termination();
    let mut tasks = JoinSet::new();
    let mut lines = input.lines();
    let mut terminated = false;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => handle_line(&coordinator, &replies, &mut tasks, &line),
                None => {
                    log::info!("Front-end closed its channel");
                    break;
                }
            },
            _ = signalled(&mut termination) => {
                terminated = true;
                break;
            }
        }
    }

    if terminated {
        tasks.abort_all();
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if !e.is_cancelled() {
                log::error!("Command task failed: {}", e);
            }
        }
    }

    drop(replies);
    writer.await?;
    Ok(())
}

fn handle_line(
    coordinator: &Coordinator,
    replies: &UnboundedSender<MessageOut>,
    tasks: &mut JoinSet<()>,
    line: &str,
) {
    let message: MessageIn = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("Ignoring malformed command: {}", e);
            let _ = replies.send(MessageOut::Failure {
                id: Value::Null,
                error: format!("Malformed command: {}", e),
            });
            return;
        }
    };

    let coordinator = coordinator.clone();
    let replies = replies.clone();
    tasks.spawn(async move {
        let result = match message.payload_bytes() {
            Ok(payload) => coordinator.handle(&message.name, &payload).await,
            Err(e) => Err(e),
        };
        let reply = match result {
            Ok(result) => MessageOut::Reply {
                id: message.id,
                result,
            },
            Err(e) => MessageOut::Failure {
                id: message.id,
                error: e.to_string(),
            },
        };
        let _ = replies.send(reply);
    });
}

/// Writes replies and events until every reply sender is gone
async fn write_loop<W>(
    mut output: W,
    mut replies: UnboundedReceiver<MessageOut>,
    mut events: UnboundedReceiver<UiEvent>,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let message = tokio::select! {
            biased;
            reply = replies.recv() => match reply {
                Some(reply) => reply,
                None => break,
            },
            Some(event) = events.recv() => match MessageOut::from_event(&event) {
                Some(message) => message,
                None => continue,
            },
        };

        if let Err(e) = write_message(&mut output, &message).await {
            log::error!("Unable to write to front-end: {}", e);
            break;
        }
    }
}

async fn write_message<W>(output: &mut W, message: &MessageOut) -> Result<(), MinerError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await?;
    Ok(())
}
