//! Queue manager: mirrors the controller's task queue and turns user intents
//! into controller requests.
//!
//! The local queue is never patched. Every `update_queue_list` replaces it
//! wholesale, so the last snapshot received is always the state shown.

use std::collections::{HashMap, HashSet};

use shared::{
    domain::{
        Backend, Operation, Outcome, ProgressStatus, QueueItem, Severity, TaskState, TaskStatus,
    },
    protocol::ViewRequest,
};
use tracing::{debug, info, warn};

use crate::{
    channel::SharedLink,
    error::{ContractViolation, ViewError},
    events::{EventBus, ViewEvent},
    presentation::QueueListing,
};

pub struct QueueManager {
    link: SharedLink,
    events: EventBus,
    items: Vec<QueueItem>,
    progress: ProgressStatus,
    violations: Vec<ContractViolation>,
}

impl QueueManager {
    pub fn new(link: SharedLink, events: EventBus) -> Self {
        Self {
            link,
            events,
            items: Vec::new(),
            progress: ProgressStatus::idle(),
            violations: Vec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Badge length: every item in the snapshot, finished ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn outstanding_len(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state != TaskState::Processed)
            .count()
    }

    pub fn active(&self) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.is_processing())
    }

    pub fn progress(&self) -> &ProgressStatus {
        &self.progress
    }

    /// Violations found in the most recent snapshot.
    pub fn last_violations(&self) -> &[ContractViolation] {
        &self.violations
    }

    pub fn listing(&self) -> QueueListing<'_> {
        QueueListing::from_items(&self.items)
    }

    pub fn request_add(&self, backend: Backend, operation: Operation, id: impl Into<String>) {
        self.link.send(ViewRequest::QueueAddItem {
            backend,
            operation,
            id: id.into(),
        });
    }

    /// The renderer disables this control for the processing item; the
    /// request is forwarded regardless.
    pub fn request_drop(&self, id: impl Into<String>) {
        let id = id.into();
        if self.get(&id).is_some_and(QueueItem::is_processing) {
            warn!(item_id = %id, "drop requested for the processing item");
        }
        self.link.send(ViewRequest::QueueDropItem { id });
    }

    pub fn request_clear(&self) {
        self.link.send(ViewRequest::QueueClear);
    }

    /// Advisory only: the item stays as-is until a snapshot says otherwise.
    pub fn request_stop_active(&self) {
        self.link.send(ViewRequest::QueueStopActive);
    }

    pub fn request_launch(&self, id: impl Into<String>) {
        self.link.send(ViewRequest::AppLaunch { id: id.into() });
    }

    pub fn request_error_details(&self, id: impl Into<String>) {
        self.link.send(ViewRequest::AppShowError { id: id.into() });
    }

    /// Re-adds a failed task with the same backend, operation and id.
    pub fn request_retry(&self, id: &str) -> Result<(), ViewError> {
        let item = self
            .get(id)
            .ok_or_else(|| ViewError::UnknownQueueItem(id.to_string()))?;
        if !matches!(item.status(), TaskStatus::Processed(Outcome::Failed)) {
            return Err(ViewError::NotRetryable(id.to_string()));
        }
        let backend = item
            .backend()
            .ok_or_else(|| ViewError::UnknownBackend(id.to_string()))?;
        self.request_add(backend, item.operation, item.id.clone());
        Ok(())
    }

    pub fn on_queue_snapshot(&mut self, items: Vec<QueueItem>) -> &[ContractViolation] {
        let mut violations = validate_snapshot(&items);
        violations.extend(validate_transitions(&self.items, &items));
        for violation in &violations {
            warn!(%violation, "controller queue snapshot violates the queue contract");
        }

        let had_active = self.active().is_some();
        self.items = items;
        self.violations = violations;

        debug!(
            total = self.items.len(),
            outstanding = self.outstanding_len(),
            "applied queue snapshot"
        );
        self.events.emit(ViewEvent::QueueLengthChanged {
            total: self.items.len(),
            outstanding: self.outstanding_len(),
        });

        if had_active && self.active().is_none() && self.progress.severity == Severity::Busy {
            info!("queue drained; status indicator back to ready");
            self.set_progress(ProgressStatus::idle());
        }

        &self.violations
    }

    pub fn on_progress_update(&mut self, status: ProgressStatus) {
        if status.severity == Severity::Busy && status.action_text.trim().is_empty() {
            warn!(
                violation = %ContractViolation::BusyWithoutAction,
                "controller progress update violates the queue contract"
            );
        }
        self.set_progress(status);
    }

    fn set_progress(&mut self, status: ProgressStatus) {
        self.progress = status;
        self.events
            .emit(ViewEvent::ProgressChanged(self.progress.clone()));
    }
}

/// Checks one snapshot on its own.
pub fn validate_snapshot(items: &[QueueItem]) -> Vec<ContractViolation> {
    let mut violations = Vec::new();

    let processing: Vec<String> = items
        .iter()
        .filter(|item| item.is_processing())
        .map(|item| item.id.clone())
        .collect();
    if processing.len() > 1 {
        violations.push(ContractViolation::MultipleProcessing { ids: processing });
    }

    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id.as_str()) {
            violations.push(ContractViolation::DuplicateId {
                id: item.id.clone(),
            });
        }
        match (item.state, item.success) {
            (TaskState::Processed, None) => violations.push(ContractViolation::MissingSuccess {
                id: item.id.clone(),
            }),
            (TaskState::Pending | TaskState::Processing, Some(_)) => {
                violations.push(ContractViolation::SuccessBeforeProcessed {
                    id: item.id.clone(),
                    state: item.state,
                })
            }
            _ => {}
        }
    }

    violations
}

/// Checks how items present in both snapshots moved between them.
pub fn validate_transitions(previous: &[QueueItem], next: &[QueueItem]) -> Vec<ContractViolation> {
    let before: HashMap<&str, &QueueItem> = previous
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut violations = Vec::new();
    for item in next {
        let Some(old) = before.get(item.id.as_str()) else {
            continue;
        };
        let (from, to) = (old.state, item.state);
        if to.rank() < from.rank() {
            violations.push(ContractViolation::StateRegressed {
                id: item.id.clone(),
                from,
                to,
            });
        } else if to.rank() > from.rank() + 1 {
            violations.push(ContractViolation::StateSkipped {
                id: item.id.clone(),
                from,
                to,
            });
        } else if from == TaskState::Processed
            && to == TaskState::Processed
            && old.success != item.success
        {
            violations.push(ContractViolation::OutcomeChanged {
                id: item.id.clone(),
            });
        }
    }
    violations
}

#[cfg(test)]
#[path = "tests/queue_tests.rs"]
mod tests;
