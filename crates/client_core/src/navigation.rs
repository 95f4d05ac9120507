//! Page history ("tab memory").
//!
//! The top entry is always the page on screen. Depth grows on every
//! `change_page` and shrinks only through `go_back`, unless a `max_depth` is
//! configured.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ViewError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub page_name: String,
    /// Whatever the page needs to rebuild itself without asking the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_data: Option<Value>,
}

impl NavigationEntry {
    pub fn new(page_name: impl Into<String>, page_data: Option<Value>) -> Self {
        Self {
            page_name: page_name.into(),
            page_data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NavigationConfig {
    /// Re-selecting the page on screen does not add a history entry.
    #[serde(default)]
    pub collapse_repeats: bool,
    /// Oldest entries are discarded beyond this depth. Zero means unbounded.
    #[serde(default, deserialize_with = "depth_limit")]
    pub max_depth: Option<usize>,
}

fn depth_limit<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<usize>::deserialize(deserializer)?.filter(|depth| *depth > 0))
}

#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    config: NavigationConfig,
    entries: Vec<NavigationEntry>,
}

impl NavigationStack {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    pub fn change_page(
        &mut self,
        page_name: impl Into<String>,
        page_data: Option<Value>,
    ) -> &NavigationEntry {
        let entry = NavigationEntry::new(page_name, page_data);
        let repeat = self.entries.last() == Some(&entry);

        if repeat && self.config.collapse_repeats {
            debug!(page = %entry.page_name, "page re-selected; history unchanged");
        } else {
            debug!(page = %entry.page_name, depth = self.entries.len() + 1, "page pushed");
            self.entries.push(entry);
            self.enforce_max_depth();
        }

        &self.entries[self.entries.len() - 1]
    }

    /// Drops the current page and re-enters the one before it, which ends up
    /// on top again exactly as a forward navigation would leave it.
    pub fn go_back(&mut self) -> Result<&NavigationEntry, ViewError> {
        if !self.can_go_back() {
            return Err(ViewError::EmptyHistory);
        }

        self.entries.pop();
        let Some(previous) = self.entries.pop() else {
            return Err(ViewError::EmptyHistory);
        };
        debug!(page = %previous.page_name, "navigating back");
        Ok(self.change_page(previous.page_name, previous.page_data))
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.entries.last()
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current().map(|entry| entry.page_name.as_str())
    }

    pub fn current_page_data(&self) -> Option<&Value> {
        self.current().and_then(|entry| entry.page_data.as_ref())
    }

    pub fn is_current(&self, page_name: &str) -> bool {
        self.current_page() == Some(page_name)
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    fn enforce_max_depth(&mut self) {
        let Some(max_depth) = self.config.max_depth.filter(|depth| *depth > 0) else {
            return;
        };
        if self.entries.len() > max_depth {
            let excess = self.entries.len() - max_depth;
            self.entries.drain(..excess);
            debug!(discarded = excess, "history trimmed to max depth");
        }
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
