use super::*;
use crate::test_support::{drain, RecordingLink};
use serde_json::json;
use shared::domain::{Backend, Operation, ProgressStatus, SettingValue, TaskState};

fn view() -> (ViewCore, RecordingLink, broadcast::Receiver<ViewEvent>) {
    let (recorder, link) = RecordingLink::shared();
    let core = ViewCore::new(&ViewConfig::default(), link);
    let rx = core.subscribe_events();
    (core, recorder, rx)
}

fn page_changes(events: &[ViewEvent]) -> Vec<(String, bool)> {
    events
        .iter()
        .filter_map(|event| match event {
            ViewEvent::PageChanged { entry, can_go_back } => {
                Some((entry.page_name.clone(), *can_go_back))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn start_requests_settings_and_opens_the_first_page() {
    let (mut core, recorder, mut rx) = view();

    core.start("browse");

    assert_eq!(recorder.names(), vec!["settings_get_data"]);
    assert_eq!(core.navigation().current_page(), Some("browse"));
    assert_eq!(
        page_changes(&drain(&mut rx)),
        vec![("browse".to_string(), false)]
    );
}

#[test]
fn queue_snapshot_redraws_the_list_only_on_the_queue_page() {
    let (mut core, _, mut rx) = view();
    core.change_page("browse", None);
    drain(&mut rx);

    core.receive_raw(r#"{"request": "update_queue_list", "queue": []}"#);
    let events = drain(&mut rx);
    assert!(events.contains(&ViewEvent::QueueLengthChanged {
        total: 0,
        outstanding: 0
    }));
    assert!(!events.contains(&ViewEvent::QueueListInvalidated));

    core.change_page(QUEUE_PAGE, None);
    drain(&mut rx);
    core.receive_raw(r#"{"request": "update_queue_list", "queue": []}"#);
    assert!(drain(&mut rx).contains(&ViewEvent::QueueListInvalidated));
}

#[test]
fn progress_updates_reach_the_status_indicator_on_any_page() {
    let (mut core, _, mut rx) = view();
    core.change_page("settings", None);
    drain(&mut rx);

    core.receive_raw(
        r#"{"request": "update_queue_status", "state": "busy", "action_text": "Installing Caja",
            "details_text": "", "value": -1, "value_end": 10}"#,
    );

    let status = ProgressStatus::busy("Installing Caja", -1.0, 10.0);
    assert_eq!(core.queue().progress(), &status);
    assert_eq!(drain(&mut rx), vec![ViewEvent::ProgressChanged(status)]);
    assert_eq!(
        ProgressIndicator::from_status(core.queue().progress()),
        ProgressIndicator::Indeterminate
    );
}

#[test]
fn malformed_and_unknown_envelopes_change_nothing() {
    let (mut core, recorder, mut rx) = view();
    core.receive_raw(
        r#"{"request": "update_queue_list", "queue": [{"id": "a", "operation": "install", "state": "pending"}]}"#,
    );
    drain(&mut rx);

    for raw in [
        "",
        "definitely not json",
        r#"{"queue": []}"#,
        r#"{"request": "update_queue_list"}"#,
        r#"{"request": "update_queue_list", "queue": [{"id": "b", "state": "exploded"}]}"#,
        r#"{"request": "update_queue_state", "state": "busy"}"#,
        r#"{"request": "queue_update_state"}"#,
        r#"{"request": 7}"#,
    ] {
        core.receive_raw(raw);
    }

    assert_eq!(core.queue().len(), 1);
    assert_eq!(core.queue().progress(), &ProgressStatus::idle());
    assert!(drain(&mut rx).is_empty());
    assert!(recorder.take().is_empty());
}

#[test]
fn back_reruns_page_entry_effects() {
    let (mut core, recorder, mut rx) = view();
    core.change_page(SETTINGS_PAGE, None);
    core.change_page("search", Some(json!({ "query": "vlc" })));
    assert_eq!(recorder.names(), vec!["settings_get_data"]);
    drain(&mut rx);

    core.go_back().expect("earlier page exists");

    assert_eq!(recorder.names(), vec!["settings_get_data"]);
    assert_eq!(core.navigation().current_page(), Some(SETTINGS_PAGE));
    assert_eq!(
        page_changes(&drain(&mut rx)),
        vec![(SETTINGS_PAGE.to_string(), false)]
    );
}

#[test]
fn back_to_the_queue_page_invalidates_the_listing() {
    let (mut core, _, mut rx) = view();
    core.change_page(QUEUE_PAGE, None);
    core.change_page("installed", None);
    drain(&mut rx);

    core.go_back().expect("back");

    let events = drain(&mut rx);
    assert_eq!(events[0], ViewEvent::QueueListInvalidated);
    assert_eq!(page_changes(&events), vec![(QUEUE_PAGE.to_string(), false)]);
}

#[test]
fn back_without_history_is_a_no_op() {
    let (mut core, recorder, mut rx) = view();
    core.change_page("browse", None);
    drain(&mut rx);

    assert!(matches!(core.go_back(), Err(ViewError::EmptyHistory)));
    assert_eq!(core.navigation().current_page(), Some("browse"));
    assert!(drain(&mut rx).is_empty());
    assert!(recorder.take().is_empty());
}

#[test]
fn settings_snapshot_is_dispatched_to_the_store() {
    let (mut core, _, mut rx) = view();
    core.settings_mut()
        .set_key("show_advanced", true)
        .expect("writable key");
    drain(&mut rx);

    let data = json!({ "show_advanced": false, "version": { "boutique": "1.0" } }).to_string();
    let envelope = json!({ "request": "settings_recv_data", "data": data }).to_string();
    core.receive_raw(&envelope);

    assert_eq!(
        core.settings().get("show_advanced"),
        Some(&SettingValue::Bool(false))
    );
    assert_eq!(drain(&mut rx), vec![ViewEvent::SettingsChanged]);
}

#[test]
fn bad_settings_payload_keeps_the_local_mirror() {
    let (mut core, _, _) = view();
    core.settings_mut()
        .set_key("show_advanced", true)
        .expect("writable key");

    core.receive_raw(r#"{"request": "settings_recv_data", "data": "[1, 2]"}"#);

    assert!(core.settings().flag("show_advanced"));
}

#[test]
fn page_payloads_are_forwarded_to_the_renderer() {
    let (mut core, recorder, mut rx) = view();
    core.request_app_list("games", "#app-list");
    core.request_app_info("apt:caja");
    assert_eq!(recorder.names(), vec!["request_app_list", "app_info"]);

    core.receive_raw(r#"{"request": "populate_app_list", "category": "games", "apps": []}"#);
    core.receive_raw(r#"{"request": "open_app_details", "data": {"id": "apt:caja"}}"#);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    let ViewEvent::AppListReceived(list) = &events[0] else {
        panic!("unexpected event {:?}", events[0]);
    };
    assert_eq!(list["category"], "games");
    let ViewEvent::AppDetailsReceived(details) = &events[1] else {
        panic!("unexpected event {:?}", events[1]);
    };
    assert_eq!(details["data"]["id"], "apt:caja");
}

#[test]
fn only_web_links_are_opened() {
    let (core, recorder, _) = view();

    core.open_uri("https://ubuntu-mate.org/about")
        .expect("https is allowed");
    assert!(matches!(
        core.open_uri("file:///etc/passwd"),
        Err(ViewError::InvalidUri { .. })
    ));
    assert!(matches!(
        core.open_uri("not a uri"),
        Err(ViewError::InvalidUri { .. })
    ));

    assert_eq!(
        recorder.take(),
        vec![ViewRequest::OpenUri {
            uri: "https://ubuntu-mate.org/about".into()
        }]
    );
}

#[test]
fn install_flow_ends_with_a_launch_affordance() {
    let (mut core, recorder, _) = view();
    core.change_page(QUEUE_PAGE, None);

    core.queue()
        .request_add(Backend::SystemPackage, Operation::Install, "pkg-a");
    assert_eq!(recorder.names(), vec!["queue_add_item"]);
    assert!(core.queue().is_empty());

    core.receive_raw(
        r#"{"request": "update_queue_list", "queue": [
            {"id": "pkg-a", "name": "Package A", "backend": "apt", "operation": "install", "state": "pending"}]}"#,
    );
    assert_eq!(core.queue().listing().pending.len(), 1);

    core.receive_raw(
        r#"{"request": "update_queue_list", "queue": [
            {"id": "pkg-a", "name": "Package A", "backend": "apt", "operation": "install", "state": "processing"}]}"#,
    );
    core.receive_raw(
        r#"{"request": "update_queue_state", "state": "busy", "action_text": "Installing Package A",
            "details_text": "", "value": 2, "value_end": 4}"#,
    );
    assert_eq!(core.queue().listing().processing.len(), 1);

    core.receive_raw(
        r#"{"request": "update_queue_list", "queue": [
            {"id": "pkg-a", "name": "Package A", "backend": "apt", "operation": "install", "state": "processed", "success": true}]}"#,
    );

    let listing = core.queue().listing();
    assert_eq!(listing.processed.len(), 1);
    assert_eq!(listing.processed[0].affordance(), Affordance::Launch);
    assert_eq!(core.queue().len(), 1);
    assert!(core.queue().last_violations().is_empty());
    assert_eq!(core.queue().progress(), &ProgressStatus::idle());
    assert_eq!(
        core.queue().get("pkg-a").map(|item| item.state),
        Some(TaskState::Processed)
    );
}
