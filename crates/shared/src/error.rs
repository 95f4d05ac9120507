use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("envelope has no `request` discriminator")]
    MissingRequest,
    #[error("malformed `{request}` envelope: {source}")]
    Malformed {
        request: String,
        source: serde_json::Error,
    },
    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("settings payload must be a JSON object")]
    SettingsNotObject,
    #[error("settings payload is not valid JSON: {0}")]
    SettingsJson(serde_json::Error),
    #[error("settings section `{section}` is malformed: {source}")]
    InvalidSettingsSection {
        section: String,
        source: serde_json::Error,
    },
}

impl ProtocolError {
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Name of the envelope that failed to decode, when one was present.
    pub fn request(&self) -> Option<&str> {
        match self {
            Self::Malformed { request, .. } => Some(request),
            _ => None,
        }
    }
}
