use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{Backend, Operation, ProgressStatus, QueueItem, SettingValue},
    error::ProtocolError,
};

/// Messages the view sends to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum ViewRequest {
    QueueAddItem {
        backend: Backend,
        operation: Operation,
        id: String,
    },
    QueueDropItem {
        id: String,
    },
    QueueClear,
    QueueStopActive,
    SettingsSetKey {
        key: String,
        value: SettingValue,
    },
    SettingsGetData,
    AppLaunch {
        id: String,
    },
    AppShowError {
        id: String,
    },
    OpenUri {
        uri: String,
    },
    RequestAppList {
        category: String,
        element: String,
    },
    AppInfo {
        id: String,
    },
}

impl ViewRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueueAddItem { .. } => "queue_add_item",
            Self::QueueDropItem { .. } => "queue_drop_item",
            Self::QueueClear => "queue_clear",
            Self::QueueStopActive => "queue_stop_active",
            Self::SettingsSetKey { .. } => "settings_set_key",
            Self::SettingsGetData => "settings_get_data",
            Self::AppLaunch { .. } => "app_launch",
            Self::AppShowError { .. } => "app_show_error",
            Self::OpenUri { .. } => "open_uri",
            Self::RequestAppList { .. } => "request_app_list",
            Self::AppInfo { .. } => "app_info",
        }
    }

    /// Flat JSON object with the `request` discriminator.
    pub fn to_envelope(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Messages the controller pushes to the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum ControllerEvent {
    UpdateQueueList {
        queue: Vec<QueueItem>,
    },
    #[serde(alias = "update_queue_status")]
    UpdateQueueState(ProgressStatus),
    SettingsRecvData {
        data: Value,
    },
    PopulateAppList {
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    OpenAppDetails {
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    #[serde(other)]
    Unknown,
}

/// A decoded inbound envelope together with its raw `request` name.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEnvelope {
    pub request: String,
    pub event: ControllerEvent,
}

impl InboundEnvelope {
    pub fn is_unknown(&self) -> bool {
        matches!(self.event, ControllerEvent::Unknown)
    }
}

pub fn decode_envelope(raw: &str) -> Result<InboundEnvelope, ProtocolError> {
    let value: Value = serde_json::from_str(raw)?;
    decode_value(value)
}

pub fn decode_value(value: Value) -> Result<InboundEnvelope, ProtocolError> {
    let request = value
        .get("request")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ProtocolError::MissingRequest)?;

    match serde_json::from_value(value) {
        Ok(event) => Ok(InboundEnvelope { request, event }),
        Err(source) => Err(ProtocolError::Malformed { request, source }),
    }
}
