use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::navigation::NavigationConfig;

pub const DEFAULT_CONFIG_FILE: &str = "store-view.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub start_page: String,
    pub event_capacity: usize,
    pub log_filter: String,
    pub navigation: NavigationConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            start_page: "browse".into(),
            event_capacity: 256,
            log_filter: "info".into(),
            navigation: NavigationConfig::default(),
        }
    }
}

/// Reads `path` (which must exist) or, without one, `store-view.toml` in the
/// working directory when present; environment overrides apply last.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ViewConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_config_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => ViewConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn read_config_file(path: &Path) -> anyhow::Result<ViewConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_config(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_config(raw: &str) -> anyhow::Result<ViewConfig> {
    Ok(toml::from_str(raw)?)
}

pub fn apply_env_overrides(config: &mut ViewConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__START_PAGE") {
        config.start_page = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        config.log_filter = v;
    }
    if let Some(v) = lookup("RUST_LOG") {
        config.log_filter = v;
    }

    if let Some(v) = lookup("APP__EVENT_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            config.event_capacity = parsed;
        }
    }

    if let Some(v) = lookup("APP__NAV_COLLAPSE_REPEATS") {
        if let Ok(parsed) = v.parse::<bool>() {
            config.navigation.collapse_repeats = parsed;
        }
    }
    if let Some(v) = lookup("APP__NAV_MAX_DEPTH") {
        config.navigation.max_depth = match v.trim() {
            "" | "none" | "0" => None,
            other => other.parse::<usize>().ok().or(config.navigation.max_depth),
        };
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
