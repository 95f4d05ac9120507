use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Install source a queue task runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    #[serde(rename = "apt", alias = "system-package")]
    SystemPackage,
    #[serde(rename = "snap", alias = "snapd", alias = "sandboxed-package")]
    SandboxedPackage,
    #[serde(rename = "curated", alias = "index", alias = "curated-index")]
    CuratedIndex,
}

impl Backend {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::SystemPackage => "apt",
            Self::SandboxedPackage => "snap",
            Self::CuratedIndex => "curated",
        }
    }

    /// Controller item ids are prefixed with their source, e.g. `apt:caja`.
    pub fn from_item_id(id: &str) -> Option<Self> {
        let (prefix, _) = id.split_once(':')?;
        prefix.parse().ok()
    }
}

impl FromStr for Backend {
    type Err = ProtocolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apt" | "system-package" => Ok(Self::SystemPackage),
            "snap" | "snapd" | "sandboxed-package" => Ok(Self::SandboxedPackage),
            "curated" | "index" | "curated-index" => Ok(Self::CuratedIndex),
            _ => Err(ProtocolError::unknown_variant("backend", value)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Install,
    Remove,
}

impl FromStr for Operation {
    type Err = ProtocolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "install" => Ok(Self::Install),
            "remove" => Ok(Self::Remove),
            _ => Err(ProtocolError::unknown_variant("operation", value)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Remove => "remove",
        })
    }
}

/// Lifecycle of a queue task. Only ever advances `Pending -> Processing -> Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Processing,
    Processed,
}

impl TaskState {
    pub fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Processed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Processing,
    Processed(Outcome),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(alias = "action")]
    pub operation: Operation,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl QueueItem {
    pub fn new(id: impl Into<String>, operation: Operation, state: TaskState) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            icon: String::new(),
            backend: None,
            operation,
            state,
            success: None,
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn backend(&self) -> Option<Backend> {
        self.backend.or_else(|| Backend::from_item_id(&self.id))
    }

    /// Typed view of `state`/`success`. A processed item without a `success`
    /// flag counts as failed.
    pub fn status(&self) -> TaskStatus {
        match self.state {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Processing => TaskStatus::Processing,
            TaskState::Processed if self.success == Some(true) => {
                TaskStatus::Processed(Outcome::Succeeded)
            }
            TaskState::Processed => TaskStatus::Processed(Outcome::Failed),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.state == TaskState::Processing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Ok,
    Busy,
    Error,
}

pub const PROGRESS_HIDDEN: f64 = -1.0;

/// Status of the active task, shown by the persistent status indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStatus {
    #[serde(rename = "state", alias = "icon", default)]
    pub severity: Severity,
    pub action_text: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub details_text: String,
    #[serde(deserialize_with = "lenient_number")]
    pub value: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub value_end: f64,
}

impl ProgressStatus {
    pub fn idle() -> Self {
        Self {
            severity: Severity::Ok,
            action_text: String::new(),
            details_text: String::new(),
            value: 0.0,
            value_end: PROGRESS_HIDDEN,
        }
    }

    pub fn busy(action_text: impl Into<String>, value: f64, value_end: f64) -> Self {
        Self {
            severity: Severity::Busy,
            action_text: action_text.into(),
            details_text: String::new(),
            value,
            value_end,
        }
    }

    pub fn with_details(mut self, details_text: impl Into<String>) -> Self {
        self.details_text = details_text.into();
        self
    }
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::idle()
    }
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

// The controller formats some progress values with str().
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Number(value) => Ok(value),
        LooseNumber::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got `{text}`"))),
    }
}

// Timestamps sometimes arrive as floats; the fraction is dropped.
fn lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseNumber>::deserialize(deserializer)? {
        None => Ok(0),
        Some(LooseNumber::Number(value)) => Ok(value.trunc() as i64),
        Some(LooseNumber::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(|value| value.trunc() as i64)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got `{text}`"))),
    }
}

/// A backend reported as `null` is unavailable.
fn availability_flags<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flags = Option::<BTreeMap<String, Option<bool>>>::deserialize(deserializer)?;
    Ok(flags
        .unwrap_or_default()
        .into_iter()
        .map(|(name, available)| (name, available.unwrap_or(false)))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    /// Integers stay integers on the wire.
    Number(serde_json::Number),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(value) => value.as_i64(),
            _ => None,
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(Self::Bool(*v)),
            Value::Number(v) => Some(Self::Number(v.clone())),
            Value::String(v) => Some(Self::Text(v.clone())),
            _ => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// JSON has no NaN or infinity; those are carried as text.
impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(value.to_string()))
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Keys of the snapshot owned by the controller; never written by the view.
pub const READ_ONLY_SETTINGS: [&str; 3] = ["version", "backends", "index"];

pub fn is_read_only_setting(key: &str) -> bool {
    READ_ONLY_SETTINGS.contains(&key)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default, deserialize_with = "nullable_text")]
    pub boutique: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub available: bool,
    #[serde(default, deserialize_with = "nullable_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub revision: i64,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "nullable_text")]
    pub info_url: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub support_url: String,
}

impl IndexInfo {
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        if !self.available || self.timestamp <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsInfo {
    #[serde(default)]
    pub version: VersionInfo,
    #[serde(default, deserialize_with = "availability_flags")]
    pub backends: BTreeMap<String, bool>,
    #[serde(default)]
    pub index: IndexInfo,
}

impl SettingsInfo {
    pub fn backend_available(&self, backend: Backend) -> bool {
        self.backends
            .get(backend.wire_name())
            .copied()
            .unwrap_or(false)
    }
}

/// Full settings payload as pushed by the controller.
#[derive(Debug, Default)]
pub struct SettingsSnapshot {
    pub values: BTreeMap<String, SettingValue>,
    pub info: SettingsInfo,
    /// Keys whose values were neither boolean, number nor string.
    pub ignored_keys: Vec<String>,
    /// Read-only sections that failed to parse and were reset to defaults.
    pub invalid_sections: Vec<ProtocolError>,
}

impl SettingsSnapshot {
    /// Accepts the object itself or a JSON string that encodes it.
    pub fn from_payload(payload: &Value) -> Result<Self, ProtocolError> {
        match payload {
            Value::String(raw) => {
                let parsed: Value =
                    serde_json::from_str(raw).map_err(ProtocolError::SettingsJson)?;
                Self::from_object(&parsed)
            }
            other => Self::from_object(other),
        }
    }

    /// User values are always taken. A malformed read-only section only
    /// loses that section.
    fn from_object(value: &Value) -> Result<Self, ProtocolError> {
        let object = value.as_object().ok_or(ProtocolError::SettingsNotObject)?;
        let mut snapshot = Self::default();

        for (key, value) in object {
            match key.as_str() {
                "version" => snapshot.info.version = snapshot.read_section(key, value),
                "backends" => snapshot.info.backends = snapshot.read_section(key, value),
                "index" => snapshot.info.index = snapshot.read_section(key, value),
                _ => match SettingValue::from_json(value) {
                    Some(setting) => {
                        snapshot.values.insert(key.clone(), setting);
                    }
                    None => snapshot.ignored_keys.push(key.clone()),
                },
            }
        }

        Ok(snapshot)
    }

    fn read_section<T>(&mut self, section: &str, value: &Value) -> T
    where
        T: DeserializeOwned + Default,
    {
        T::deserialize(value).unwrap_or_else(|source| {
            self.invalid_sections.push(ProtocolError::InvalidSettingsSection {
                section: section.to_string(),
                source,
            });
            T::default()
        })
    }
}
