// src/ui/mod.rs
//! Front-end facing side of the control plane
//!
//! The rendering shell is external. It talks to the coordinator through the
//! JSON-lines [`transport`] and receives [`UiEvent`]s pushed by the stats loops
//! and the fatal-condition supervisor.

/// Outbound events and the channel carrying them
pub mod events;

/// stdin/stdout JSON-lines transport
pub mod transport;

pub use events::{UiEvent, UiHandle};
pub use transport::{MessageIn, MessageOut, serve};
