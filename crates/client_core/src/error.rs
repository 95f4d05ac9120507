use std::fmt;

use shared::{domain::TaskState, error::ProtocolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("navigation history has no earlier page")]
    EmptyHistory,
    #[error("setting `{0}` is owned by the controller")]
    ReadOnlySetting(String),
    #[error("refusing to open `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("no queue item with id `{0}`")]
    UnknownQueueItem(String),
    #[error("queue item `{0}` has not failed; nothing to retry")]
    NotRetryable(String),
    #[error("cannot tell which backend queue item `{0}` belongs to")]
    UnknownBackend(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// A controller push that breaks the queue contract. Snapshots are still
/// applied as given; violations are only reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    MultipleProcessing {
        ids: Vec<String>,
    },
    DuplicateId {
        id: String,
    },
    SuccessBeforeProcessed {
        id: String,
        state: TaskState,
    },
    MissingSuccess {
        id: String,
    },
    StateRegressed {
        id: String,
        from: TaskState,
        to: TaskState,
    },
    StateSkipped {
        id: String,
        from: TaskState,
        to: TaskState,
    },
    OutcomeChanged {
        id: String,
    },
    BusyWithoutAction,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleProcessing { ids } => {
                write!(f, "{} items processing at once: {}", ids.len(), ids.join(", "))
            }
            Self::DuplicateId { id } => write!(f, "queue id `{id}` appears more than once"),
            Self::SuccessBeforeProcessed { id, state } => {
                write!(f, "item `{id}` carries a success flag while {state:?}")
            }
            Self::MissingSuccess { id } => {
                write!(f, "processed item `{id}` has no success flag")
            }
            Self::StateRegressed { id, from, to } => {
                write!(f, "item `{id}` moved backwards from {from:?} to {to:?}")
            }
            Self::StateSkipped { id, from, to } => {
                write!(f, "item `{id}` jumped from {from:?} to {to:?}")
            }
            Self::OutcomeChanged { id } => {
                write!(f, "processed item `{id}` changed its outcome")
            }
            Self::BusyWithoutAction => f.write_str("busy status without action text"),
        }
    }
}
