// src/coordinator/supervisor.rs
//! Notify-then-terminate handling of fatal conditions

use crate::ui::{UiEvent, UiHandle};
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time;

/// Routes fatal conditions to the user and requests process termination
///
/// A fatal message is pushed to the UI, then the supervisor waits until the UI
/// acknowledges it or the grace period elapses, whichever comes first. Only
/// then is the termination signal raised.
pub struct Supervisor {
    ui: UiHandle,
    grace_period: Duration,
    acknowledged: Notify,
    terminate: watch::Sender<bool>,
}

impl Supervisor {
    /// Creates a supervisor
    ///
    /// # Arguments
    /// * `ui` - Where `fatal_error` events go
    /// * `grace_period` - Upper bound on the acknowledgement wait
    pub fn new(ui: UiHandle, grace_period: Duration) -> Self {
        let (terminate, _) = watch::channel(false);
        Supervisor {
            ui,
            grace_period,
            acknowledged: Notify::new(),
            terminate,
        }
    }

    /// Shows `message` to the user without terminating
    pub fn report(&self, message: impl Into<String>) {
        self.ui.emit(UiEvent::FatalError {
            message: message.into(),
        });
    }

    /// Shows `message`, waits for the acknowledgement, then requests termination
    pub async fn notify_then_terminate(&self, message: &str) {
        log::error!("{}", message);

        // Registered before the event is sent so an immediate ack is not lost
        let acknowledged = self.acknowledged.notified();
        tokio::pin!(acknowledged);
        acknowledged.as_mut().enable();

        self.report(message);
        if time::timeout(self.grace_period, acknowledged).await.is_err() {
            log::warn!(
                "Front-end did not acknowledge the error within {:?}",
                self.grace_period
            );
        }

        log::info!("Requesting termination");
        self.terminate.send_replace(true);
    }

    /// Called when the UI has rendered the pending fatal message
    pub fn acknowledge(&self) {
        self.acknowledged.notify_waiters();
    }

    /// Receiver that turns `true` once termination was requested
    pub fn termination(&self) -> watch::Receiver<bool> {
        self.terminate.subscribe()
    }
}
