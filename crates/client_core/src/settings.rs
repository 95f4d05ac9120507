//! Local mirror of the controller's settings.
//!
//! Edits land locally first and are forwarded right away; there is no
//! rollback. Any snapshot from the controller overwrites the mirror.

use std::collections::BTreeMap;

use serde_json::Value;
use shared::{
    domain::{is_read_only_setting, SettingValue, SettingsInfo, SettingsSnapshot},
    protocol::ViewRequest,
};
use tracing::{debug, warn};

use crate::{
    channel::SharedLink,
    error::ViewError,
    events::{EventBus, ViewEvent},
};

pub struct SettingsStore {
    link: SharedLink,
    events: EventBus,
    values: BTreeMap<String, SettingValue>,
    info: SettingsInfo,
    has_snapshot: bool,
}

impl SettingsStore {
    pub fn new(link: SharedLink, events: EventBus) -> Self {
        Self {
            link,
            events,
            values: BTreeMap::new(),
            info: SettingsInfo::default(),
            has_snapshot: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Unset or non-boolean keys read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .and_then(SettingValue::as_bool)
            .unwrap_or(false)
    }

    pub fn values(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }

    pub fn info(&self) -> &SettingsInfo {
        &self.info
    }

    pub fn has_snapshot(&self) -> bool {
        self.has_snapshot
    }

    pub fn set_key(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SettingValue>,
    ) -> Result<(), ViewError> {
        let key = key.into();
        if is_read_only_setting(&key) {
            return Err(ViewError::ReadOnlySetting(key));
        }
        let value = value.into();

        self.values.insert(key.clone(), value.clone());
        self.events.emit(ViewEvent::SettingsChanged);
        self.link.send(ViewRequest::SettingsSetKey { key, value });
        Ok(())
    }

    pub fn request_snapshot(&self) {
        self.link.send(ViewRequest::SettingsGetData);
    }

    /// Handles the `data` field of `settings_recv_data`.
    pub fn on_snapshot(&mut self, payload: &Value) -> Result<(), ViewError> {
        let snapshot = SettingsSnapshot::from_payload(payload)?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    pub fn apply_snapshot(&mut self, snapshot: SettingsSnapshot) {
        for key in &snapshot.ignored_keys {
            warn!(key = %key, "settings snapshot value is not a boolean, number or string");
        }
        for err in &snapshot.invalid_sections {
            warn!(error = %err, "settings section reset to defaults");
        }
        self.values = snapshot.values;
        self.info = snapshot.info;
        self.has_snapshot = true;
        debug!(keys = self.values.len(), "applied settings snapshot");
        self.events.emit(ViewEvent::SettingsChanged);
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
