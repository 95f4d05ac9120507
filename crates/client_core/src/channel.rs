//! Outbound links from the view to the controller.
//!
//! Every link is fire-and-forget: `send` never blocks and never reports
//! failure to the caller. Requests sent through one link reach the controller
//! in call order or not at all.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::protocol::ViewRequest;
use tokio::sync::watch;
use tracing::{debug, warn};

pub trait ControllerLink: Send + Sync {
    fn send(&self, request: ViewRequest);
}

pub type SharedLink = Arc<dyn ControllerLink>;

/// Ordered in-process queue drained by the host.
#[derive(Clone)]
pub struct QueueLink {
    tx: Sender<ViewRequest>,
}

impl QueueLink {
    pub fn unbounded() -> (Self, Receiver<ViewRequest>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    pub fn bounded(capacity: usize) -> (Self, Receiver<ViewRequest>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl ControllerLink for QueueLink {
    fn send(&self, request: ViewRequest) {
        let name = request.name();
        match self.tx.try_send(request) {
            Ok(()) => debug!(request = name, "queued view->controller request"),
            Err(TrySendError::Full(_)) => {
                warn!(request = name, "controller link is full; request dropped")
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(request = name, "controller link disconnected; request dropped")
            }
        }
    }
}

/// Placeholder value of the property between messages.
pub const PROPERTY_IDLE: &str = "null";

/// Publishes each serialized envelope through a single observable value.
///
/// An observer that falls behind only sees the most recent envelope, so this
/// link is at-most-once with no acknowledgement.
pub struct PropertyLink {
    tx: watch::Sender<String>,
}

impl PropertyLink {
    pub fn new() -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(PROPERTY_IDLE.to_string());
        (Self { tx }, rx)
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }
}

impl ControllerLink for PropertyLink {
    fn send(&self, request: ViewRequest) {
        let name = request.name();
        match request.to_envelope() {
            Ok(envelope) => {
                self.tx.send_replace(envelope);
                debug!(request = name, "published view->controller envelope");
            }
            Err(err) => warn!(request = name, error = %err, "failed to encode envelope"),
        }
    }
}

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod tests;
