use serde_json::Value;
use shared::{
    error::ProtocolError,
    protocol::{decode_envelope, ControllerEvent, InboundEnvelope, ViewRequest},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod navigation;
pub mod presentation;
pub mod queue;
pub mod settings;

pub use channel::{ControllerLink, PropertyLink, QueueLink, SharedLink};
pub use config::ViewConfig;
pub use error::{ContractViolation, ViewError};
pub use events::{EventBus, ViewEvent};
pub use navigation::{NavigationConfig, NavigationEntry, NavigationStack};
pub use presentation::{Affordance, ProcessedOutcome, ProgressIndicator, QueueListing};
pub use queue::QueueManager;
pub use settings::SettingsStore;

pub const QUEUE_PAGE: &str = "queue";
pub const SETTINGS_PAGE: &str = "settings";

/// The view's state: one queue, one history, one settings mirror, all fed by
/// a single controller link. Construct once at startup; every inbound event
/// runs to completion before the next one is handled.
pub struct ViewCore {
    link: SharedLink,
    events: EventBus,
    queue: QueueManager,
    navigation: NavigationStack,
    settings: SettingsStore,
}

impl ViewCore {
    pub fn new(config: &ViewConfig, link: SharedLink) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            queue: QueueManager::new(link.clone(), events.clone()),
            settings: SettingsStore::new(link.clone(), events.clone()),
            navigation: NavigationStack::new(config.navigation.clone()),
            link,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Asks for the settings snapshot and opens the first page.
    pub fn start(&mut self, start_page: &str) {
        info!(page = start_page, "starting view");
        self.settings.request_snapshot();
        self.change_page(start_page, None);
    }

    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    pub fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn change_page(&mut self, page_name: &str, page_data: Option<Value>) {
        let entry = self.navigation.change_page(page_name, page_data).clone();
        self.enter_page(entry);
    }

    /// Leaves the history untouched when there is nothing to go back to.
    pub fn go_back(&mut self) -> Result<(), ViewError> {
        let entry = match self.navigation.go_back() {
            Ok(entry) => entry.clone(),
            Err(err) => {
                debug!("back requested with no earlier page");
                return Err(err);
            }
        };
        self.enter_page(entry);
        Ok(())
    }

    /// Only web links are handed to the controller.
    pub fn open_uri(&self, uri: &str) -> Result<(), ViewError> {
        let parsed = Url::parse(uri).map_err(|err| ViewError::InvalidUri {
            uri: uri.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ViewError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }
        self.link.send(ViewRequest::OpenUri {
            uri: uri.to_string(),
        });
        Ok(())
    }

    pub fn request_app_list(&self, category: impl Into<String>, element: impl Into<String>) {
        self.link.send(ViewRequest::RequestAppList {
            category: category.into(),
            element: element.into(),
        });
    }

    pub fn request_app_info(&self, id: impl Into<String>) {
        self.link.send(ViewRequest::AppInfo { id: id.into() });
    }

    /// Transport entry point. Undecodable envelopes are logged and dropped.
    pub fn receive_raw(&mut self, raw: &str) {
        match decode_envelope(raw) {
            Ok(envelope) => self.receive(envelope),
            Err(err) => log_malformed(&err),
        }
    }

    pub fn receive(&mut self, envelope: InboundEnvelope) {
        let InboundEnvelope { request, event } = envelope;
        debug!(request = %request, "controller->view envelope");

        match event {
            ControllerEvent::UpdateQueueList { queue } => {
                self.queue.on_queue_snapshot(queue);
                if self.navigation.is_current(QUEUE_PAGE) {
                    self.events.emit(ViewEvent::QueueListInvalidated);
                }
            }
            ControllerEvent::UpdateQueueState(status) => self.queue.on_progress_update(status),
            ControllerEvent::SettingsRecvData { data } => {
                if let Err(err) = self.settings.on_snapshot(&data) {
                    warn!(request = %request, error = %err, "dropping settings snapshot");
                }
            }
            ControllerEvent::PopulateAppList { payload } => {
                self.events.emit(ViewEvent::AppListReceived(payload))
            }
            ControllerEvent::OpenAppDetails { payload } => {
                self.events.emit(ViewEvent::AppDetailsReceived(payload))
            }
            ControllerEvent::Unknown => {
                debug!(request = %request, "ignoring unknown controller request")
            }
        }
    }

    /// Side effects of arriving on a page, identical for forward and back.
    fn enter_page(&mut self, entry: NavigationEntry) {
        match entry.page_name.as_str() {
            QUEUE_PAGE => self.events.emit(ViewEvent::QueueListInvalidated),
            SETTINGS_PAGE => self.settings.request_snapshot(),
            _ => {}
        }
        self.events.emit(ViewEvent::PageChanged {
            entry,
            can_go_back: self.navigation.can_go_back(),
        });
    }
}

fn log_malformed(err: &ProtocolError) {
    match err.request() {
        Some(request) => warn!(request, error = %err, "dropping malformed controller envelope"),
        None => warn!(error = %err, "dropping malformed controller envelope"),
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
