//! Log-backed renderer. Stdout belongs to the controller link, so every
//! redraw goes through tracing on stderr.

use client_core::{presentation::can_drop, ProgressIndicator, ViewCore, ViewEvent};
use shared::domain::Backend;
use tracing::info;

pub fn render(core: &ViewCore, event: &ViewEvent) {
    match event {
        ViewEvent::QueueLengthChanged { total, outstanding } => {
            info!(target: "render::badge", total, outstanding, "queue badge");
        }
        ViewEvent::QueueListInvalidated => render_queue(core),
        ViewEvent::ProgressChanged(status) => match ProgressIndicator::from_status(status) {
            ProgressIndicator::Hidden => info!(
                target: "render::status",
                severity = ?status.severity,
                action = %status.action_text,
                "status"
            ),
            ProgressIndicator::Indeterminate => info!(
                target: "render::status",
                severity = ?status.severity,
                action = %status.action_text,
                details = %status.details_text,
                "working"
            ),
            ProgressIndicator::Determinate { fraction, .. } => info!(
                target: "render::status",
                severity = ?status.severity,
                action = %status.action_text,
                details = %status.details_text,
                percent = (fraction * 100.0).round(),
                "progress"
            ),
        },
        ViewEvent::PageChanged { entry, can_go_back } => info!(
            target: "render::page",
            page = %entry.page_name,
            data = ?entry.page_data,
            back = can_go_back,
            "page"
        ),
        ViewEvent::SettingsChanged => render_settings(core),
        ViewEvent::AppListReceived(payload) => info!(
            target: "render::page",
            keys = ?payload.keys().collect::<Vec<_>>(),
            "app list"
        ),
        ViewEvent::AppDetailsReceived(payload) => info!(
            target: "render::page",
            keys = ?payload.keys().collect::<Vec<_>>(),
            "app details"
        ),
    }
}

fn render_queue(core: &ViewCore) {
    let listing = core.queue().listing();
    if listing.is_empty() {
        info!(target: "render::queue", "queue is empty");
        return;
    }
    for item in &listing.processing {
        info!(target: "render::queue", id = %item.id, name = %item.name, operation = %item.operation, "processing");
    }
    for item in &listing.pending {
        info!(
            target: "render::queue",
            id = %item.id,
            name = %item.name,
            operation = %item.operation,
            droppable = can_drop(item),
            "pending"
        );
    }
    for entry in &listing.processed {
        info!(
            target: "render::queue",
            id = %entry.item.id,
            name = %entry.item.name,
            outcome = ?entry.outcome,
            action = ?entry.affordance(),
            "processed"
        );
    }
}

fn render_settings(core: &ViewCore) {
    let settings = core.settings();
    let info = settings.info();
    let backends = [
        Backend::SystemPackage,
        Backend::SandboxedPackage,
        Backend::CuratedIndex,
    ]
    .into_iter()
    .filter(|backend| info.backend_available(*backend))
    .map(Backend::wire_name)
    .collect::<Vec<_>>();

    info!(
        target: "render::settings",
        version = %info.version.boutique,
        backends = ?backends,
        index = %info.index.name,
        index_updated = ?info.index.last_updated(),
        values = settings.values().len(),
        "settings"
    );
}
