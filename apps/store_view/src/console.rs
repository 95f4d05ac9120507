//! Line-oriented stand-in for the page UI: each line is one user action.

use anyhow::{anyhow, bail, Context, Result};
use client_core::{ViewCore, ViewError};
use serde_json::Value;
use shared::domain::{Backend, Operation, SettingValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add {
        backend: Backend,
        operation: Operation,
        id: String,
    },
    Drop(String),
    Clear,
    Stop,
    Retry(String),
    Launch(String),
    Errors(String),
    Go {
        page: String,
        data: Option<Value>,
    },
    Back,
    Set {
        key: String,
        value: SettingValue,
    },
    Open(String),
    List {
        category: String,
        element: String,
    },
    Info(String),
    Quit,
}

pub fn parse(line: &str) -> Result<Intent> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let intent = match command {
        "add" => {
            let mut words = rest.split_whitespace();
            let backend = words
                .next()
                .ok_or_else(|| anyhow!("usage: add <backend> <install|remove> <id>"))?
                .parse()?;
            let operation = words
                .next()
                .ok_or_else(|| anyhow!("usage: add <backend> <install|remove> <id>"))?
                .parse()?;
            let id = single(words.collect::<Vec<_>>().join(" ").as_str(), "add")?;
            Intent::Add {
                backend,
                operation,
                id,
            }
        }
        "drop" => Intent::Drop(single(rest, command)?),
        "clear" => Intent::Clear,
        "stop" => Intent::Stop,
        "retry" => Intent::Retry(single(rest, command)?),
        "launch" => Intent::Launch(single(rest, command)?),
        "errors" => Intent::Errors(single(rest, command)?),
        "go" => {
            let (page, data) = match rest.split_once(char::is_whitespace) {
                Some((page, data)) => (page, Some(data.trim())),
                None => (rest, None),
            };
            if page.is_empty() {
                bail!("usage: go <page> [json]");
            }
            let data = data
                .map(serde_json::from_str::<Value>)
                .transpose()
                .context("page data must be JSON")?;
            Intent::Go {
                page: page.to_string(),
                data,
            }
        }
        "back" => Intent::Back,
        "set" => {
            let (key, raw) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: set <key> <value>"))?;
            Intent::Set {
                key: key.to_string(),
                value: setting_value(raw.trim()),
            }
        }
        "open" => Intent::Open(single(rest, command)?),
        "list" => {
            let mut words = rest.split_whitespace();
            let category = words
                .next()
                .ok_or_else(|| anyhow!("usage: list <category> [element]"))?;
            Intent::List {
                category: category.to_string(),
                element: words.next().unwrap_or("#app-list").to_string(),
            }
        }
        "info" => Intent::Info(single(rest, command)?),
        "quit" | "exit" => Intent::Quit,
        other => bail!("unknown command `{other}`"),
    };
    Ok(intent)
}

pub fn apply(core: &mut ViewCore, intent: Intent) -> Result<(), ViewError> {
    match intent {
        Intent::Add {
            backend,
            operation,
            id,
        } => core.queue().request_add(backend, operation, id),
        Intent::Drop(id) => core.queue().request_drop(id),
        Intent::Clear => core.queue().request_clear(),
        Intent::Stop => core.queue().request_stop_active(),
        Intent::Retry(id) => core.queue().request_retry(&id)?,
        Intent::Launch(id) => core.queue().request_launch(id),
        Intent::Errors(id) => core.queue().request_error_details(id),
        Intent::Go { page, data } => core.change_page(&page, data),
        Intent::Back => core.go_back()?,
        Intent::Set { key, value } => core.settings_mut().set_key(key, value)?,
        Intent::Open(uri) => core.open_uri(&uri)?,
        Intent::List { category, element } => core.request_app_list(category, element),
        Intent::Info(id) => core.request_app_info(id),
        Intent::Quit => {}
    }
    Ok(())
}

fn single(rest: &str, command: &str) -> Result<String> {
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [word] => Ok((*word).to_string()),
        _ => bail!("usage: {command} <id>"),
    }
}

/// `true`, `3` and `"x"` keep their JSON type; anything else is text.
fn setting_value(raw: &str) -> SettingValue {
    serde_json::from_str(raw).unwrap_or_else(|_| SettingValue::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_core::{QueueLink, ViewConfig};
    use serde_json::json;
    use shared::protocol::ViewRequest;

    use super::*;

    #[test]
    fn parses_queue_commands() {
        assert_eq!(
            parse("add snap install vlc").expect("add"),
            Intent::Add {
                backend: Backend::SandboxedPackage,
                operation: Operation::Install,
                id: "vlc".into(),
            }
        );
        assert_eq!(parse("  drop apt:caja ").expect("drop"), Intent::Drop("apt:caja".into()));
        assert_eq!(parse("stop").expect("stop"), Intent::Stop);
        assert!(parse("add flatpak install vlc").is_err());
        assert!(parse("drop").is_err());
        assert!(parse("drop a b").is_err());
    }

    #[test]
    fn parses_page_data_and_setting_values() {
        assert_eq!(
            parse(r#"go search {"query": "vlc"}"#).expect("go"),
            Intent::Go {
                page: "search".into(),
                data: Some(json!({ "query": "vlc" })),
            }
        );
        assert!(parse("go search {broken").is_err());
        assert_eq!(
            parse("set show_advanced true").expect("set"),
            Intent::Set {
                key: "show_advanced".into(),
                value: SettingValue::Bool(true),
            }
        );
        assert_eq!(
            parse("set theme dark mode").expect("set"),
            Intent::Set {
                key: "theme".into(),
                value: SettingValue::Text("dark mode".into()),
            }
        );
        assert_eq!(
            parse("set columns 3").expect("set"),
            Intent::Set {
                key: "columns".into(),
                value: SettingValue::from(3i64),
            }
        );
        assert!(parse("frobnicate").is_err());
    }

    #[test]
    fn intents_reach_the_controller() {
        let (link, outbound) = QueueLink::unbounded();
        let mut core = ViewCore::new(&ViewConfig::default(), Arc::new(link));

        apply(&mut core, parse("add apt remove caja").expect("add")).expect("apply");
        apply(&mut core, parse("list games").expect("list")).expect("apply");
        assert!(matches!(
            apply(&mut core, parse("set version 2").expect("set")),
            Err(ViewError::ReadOnlySetting(_))
        ));
        assert!(matches!(
            apply(&mut core, parse("back").expect("back")),
            Err(ViewError::EmptyHistory)
        ));

        let sent: Vec<ViewRequest> = outbound.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                ViewRequest::QueueAddItem {
                    backend: Backend::SystemPackage,
                    operation: Operation::Remove,
                    id: "caja".into(),
                },
                ViewRequest::RequestAppList {
                    category: "games".into(),
                    element: "#app-list".into(),
                },
            ]
        );
    }
}
