use std::sync::{Arc, Mutex};

use shared::{
    domain::{Operation, QueueItem, TaskState},
    protocol::ViewRequest,
};
use tokio::sync::broadcast;

use crate::{channel::ControllerLink, events::ViewEvent, SharedLink};

#[derive(Clone, Default)]
pub(crate) struct RecordingLink {
    sent: Arc<Mutex<Vec<ViewRequest>>>,
}

impl RecordingLink {
    pub(crate) fn shared() -> (Self, SharedLink) {
        let link = Self::default();
        (link.clone(), Arc::new(link))
    }

    pub(crate) fn take(&self) -> Vec<ViewRequest> {
        std::mem::take(&mut *self.sent.lock().expect("sent lock"))
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.take().iter().map(ViewRequest::name).collect()
    }
}

impl ControllerLink for RecordingLink {
    fn send(&self, request: ViewRequest) {
        self.sent.lock().expect("sent lock").push(request);
    }
}

pub(crate) fn drain(rx: &mut broadcast::Receiver<ViewEvent>) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub(crate) fn item(id: &str, operation: Operation, state: TaskState) -> QueueItem {
    QueueItem::new(id, operation, state)
}

pub(crate) fn processed(id: &str, operation: Operation, success: bool) -> QueueItem {
    QueueItem::new(id, operation, TaskState::Processed).with_success(success)
}
