//! Render-ready projections of queue and progress state.

use shared::domain::{Operation, Outcome, ProgressStatus, QueueItem, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessedOutcome {
    InstallSucceeded,
    RemoveSucceeded,
    InstallFailed,
    RemoveFailed,
}

/// Action offered next to a finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    Launch,
    /// Error details plus a user-initiated re-add.
    Recover,
    None,
}

impl ProcessedOutcome {
    pub fn classify(operation: Operation, outcome: Outcome) -> Self {
        match (operation, outcome) {
            (Operation::Install, Outcome::Succeeded) => Self::InstallSucceeded,
            (Operation::Remove, Outcome::Succeeded) => Self::RemoveSucceeded,
            (Operation::Install, Outcome::Failed) => Self::InstallFailed,
            (Operation::Remove, Outcome::Failed) => Self::RemoveFailed,
        }
    }

    pub fn affordance(self) -> Affordance {
        match self {
            Self::InstallSucceeded => Affordance::Launch,
            Self::RemoveSucceeded => Affordance::None,
            Self::InstallFailed | Self::RemoveFailed => Affordance::Recover,
        }
    }

    pub fn succeeded(self) -> bool {
        matches!(self, Self::InstallSucceeded | Self::RemoveSucceeded)
    }
}

/// The drop control is disabled for the task currently running.
pub fn can_drop(item: &QueueItem) -> bool {
    !item.is_processing()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessedEntry<'a> {
    pub item: &'a QueueItem,
    pub outcome: ProcessedOutcome,
}

impl ProcessedEntry<'_> {
    pub fn affordance(&self) -> Affordance {
        self.outcome.affordance()
    }
}

/// Queue grouped in display order: processing, pending, processed.
/// Snapshot order is kept inside each group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueListing<'a> {
    pub processing: Vec<&'a QueueItem>,
    pub pending: Vec<&'a QueueItem>,
    pub processed: Vec<ProcessedEntry<'a>>,
}

impl<'a> QueueListing<'a> {
    pub fn from_items(items: &'a [QueueItem]) -> Self {
        let mut listing = Self::default();
        for item in items {
            match item.status() {
                TaskStatus::Processing => listing.processing.push(item),
                TaskStatus::Pending => listing.pending.push(item),
                TaskStatus::Processed(outcome) => listing.processed.push(ProcessedEntry {
                    item,
                    outcome: ProcessedOutcome::classify(item.operation, outcome),
                }),
            }
        }
        listing
    }

    pub fn is_empty(&self) -> bool {
        self.processing.is_empty() && self.pending.is_empty() && self.processed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processing.len() + self.pending.len() + self.processed.len()
    }

    pub fn ordered_ids(&self) -> Vec<&'a str> {
        let processed = self.processed.iter().map(|entry| entry.item);
        self.processing
            .iter()
            .copied()
            .chain(self.pending.iter().copied())
            .chain(processed)
            .map(|item: &'a QueueItem| item.id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressIndicator {
    Hidden,
    Indeterminate,
    Determinate { value: f64, max: f64, fraction: f64 },
}

impl ProgressIndicator {
    /// `value_end <= 0` hides the bar, `value < 0` pulses it. A ratio is only
    /// computed for a positive denominator.
    pub fn from_status(status: &ProgressStatus) -> Self {
        let (value, max) = (status.value, status.value_end);
        if max.is_nan() || max <= 0.0 {
            return Self::Hidden;
        }
        if value.is_nan() || value < 0.0 {
            return Self::Indeterminate;
        }
        Self::Determinate {
            value,
            max,
            fraction: (value / max).clamp(0.0, 1.0),
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
