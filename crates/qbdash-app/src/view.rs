//! Frame composition for the terminal output.

use qbdash_core::DashboardStore;
use qbdash_core::render::{render_contents, render_torrent_details, render_torrent_list};
use qbdash_events::{EventEnvelope, UiEvent};

/// Full dashboard frame: the torrent list followed by the details and
/// contents of every expanded torrent, in list order.
#[must_use]
pub fn render_frame(store: &DashboardStore) -> String {
    let mut frame = render_torrent_list(store);
    for torrent in store.torrents() {
        if !store.is_expanded(&torrent.hash) {
            continue;
        }
        frame.push_str(&format!("\n== {} ==\n", torrent.name));
        frame.push_str(&render_torrent_details(torrent));
        frame.push_str("  Torrent Contents\n");
        let Some(tree) = store
            .contents_tree(&torrent.hash)
            .filter(|tree| tree.file_count() > 0)
        else {
            frame.push_str("  (loading files)\n");
            continue;
        };
        frame.push_str(&render_contents(&tree, store.selection(&torrent.hash)));
    }
    frame
}

/// One-line rendering of a UI event.
#[must_use]
pub fn render_event(envelope: &EventEnvelope) -> String {
    match &envelope.event {
        UiEvent::Notification { title, body } => format!("* {title}: {body}"),
        UiEvent::Alert { title, body } => format!("! {title}: {body}"),
    }
}
