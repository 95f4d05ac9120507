//! State-change notifications fanned out to the renderer.

use serde_json::{Map, Value};
use shared::domain::ProgressStatus;
use tokio::sync::broadcast;
use tracing::trace;

use crate::navigation::NavigationEntry;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Queue badge counters after a snapshot.
    QueueLengthChanged { total: usize, outstanding: usize },
    /// The queue page is on screen and its listing is stale.
    QueueListInvalidated,
    ProgressChanged(ProgressStatus),
    PageChanged {
        entry: NavigationEntry,
        can_go_back: bool,
    },
    SettingsChanged,
    AppListReceived(Map<String, Value>),
    AppDetailsReceived(Map<String, Value>),
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ViewEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ViewEvent) {
        if self.tx.send(event).is_err() {
            trace!("no renderer subscribed; state change not delivered");
        }
    }
}
