//! Text renderers for the torrent list, torrent details and contents tree.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use qbdash_api_models::{Torrent, TorrentState};

use crate::contents::{ContentsNode, ContentsTree};
use crate::format::{format_bytes, format_duration, format_percent};
use crate::logic::{format_speed_limit, limit_to_kbps, queue_label};
use crate::selection::{SelectionMap, SelectionView};
use crate::store::DashboardStore;

/// Render the torrent list in display order, headed by the application info.
#[must_use]
pub fn render_torrent_list(store: &DashboardStore) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        store.application_info().unwrap_or("qBittorrent")
    );
    if store.torrents().is_empty() {
        let _ = writeln!(out, "  (no torrents)");
        return out;
    }
    for torrent in store.torrents() {
        out.push_str(&render_torrent(torrent));
    }
    out
}

/// Render one torrent as a title line and a statistics line.
#[must_use]
pub fn render_torrent(torrent: &Torrent) -> String {
    let mut out = String::new();
    let marker = if torrent.state.is_errored_display() {
        "!"
    } else {
        " "
    };
    let force = if torrent.force_start { "[F] " } else { "" };
    let _ = writeln!(
        out,
        "{marker}{:>4} {}  {force}{}",
        queue_label(torrent).unwrap_or_default(),
        torrent.name,
        torrent.state.label()
    );

    let _ = write!(
        out,
        "      {}  {}  down {}/s{}  up {}/s{}  peers {} ({})  {}",
        format_percent(torrent.progress),
        format_bytes(torrent.size),
        format_bytes(torrent.download_speed),
        limit_suffix(torrent.download_limit),
        format_bytes(torrent.upload_speed),
        limit_suffix(torrent.upload_limit),
        torrent.peers,
        torrent.total_peers,
        eta_label(torrent)
    );
    if !torrent.category.is_empty() {
        let _ = write!(out, "  [{}]", torrent.category);
    }
    let tags: Vec<&str> = torrent.tag_names().collect();
    if !tags.is_empty() {
        let _ = write!(out, "  #{}", tags.join(" #"));
    }
    out.push('\n');
    out
}

/// ETA text: humanised while downloading, otherwise completion status.
#[must_use]
pub fn eta_label(torrent: &Torrent) -> String {
    if torrent.state == TorrentState::Downloading {
        format_duration(u64::try_from(torrent.eta).unwrap_or(0))
    } else if torrent.is_completed() {
        "Completed".to_string()
    } else {
        "No ETA".to_string()
    }
}

/// Render the info and transfer panels shown for an expanded torrent.
#[must_use]
pub fn render_torrent_details(torrent: &Torrent) -> String {
    let mut out = String::new();
    for (heading, rows) in [
        ("Torrent Info", info_rows(torrent)),
        ("Transfer Info", transfer_rows(torrent)),
    ] {
        let _ = writeln!(out, "  {heading}");
        for (label, value) in rows {
            let _ = writeln!(out, "    {label}: {value}");
        }
    }
    out
}

fn info_rows(torrent: &Torrent) -> Vec<(&'static str, String)> {
    let completed_on = if torrent.is_completed() {
        date_label(torrent.completion_date.as_ref())
    } else {
        "Still downloading..".to_string()
    };
    let pieces = if torrent.total_pieces > 0 {
        format!(
            "{} x {} ({} downloaded)",
            torrent.total_pieces,
            format_bytes(torrent.piece_size),
            torrent.pieces_downloaded
        )
    } else {
        String::new()
    };
    vec![
        ("Hash", torrent.hash.clone()),
        ("Size", format_bytes(torrent.size)),
        ("Added On", date_label(torrent.add_date.as_ref())),
        ("Save Path", torrent.save_path.clone()),
        ("Pieces", pieces),
        ("Completed On", completed_on),
        ("Created By", torrent.created_by.clone()),
        ("Creator Comment", torrent.creator_comment.clone()),
        ("Created On", date_label(torrent.creation_date.as_ref())),
    ]
}

fn transfer_rows(torrent: &Torrent) -> Vec<(&'static str, String)> {
    let total_and_session = |total, session| {
        format!(
            "{} ({} this session)",
            format_bytes(total),
            format_bytes(session)
        )
    };
    let speed_and_average = |speed, average| {
        format!(
            "{}/s ({}/s avg.)",
            format_bytes(speed),
            format_bytes(average)
        )
    };
    vec![
        ("Time Active", format_duration(torrent.time_active)),
        ("ETA", eta_label(torrent)),
        (
            "Downloaded",
            total_and_session(torrent.bytes_downloaded, torrent.bytes_downloaded_session),
        ),
        (
            "Uploaded",
            total_and_session(torrent.bytes_uploaded, torrent.bytes_uploaded_session),
        ),
        (
            "Download Speed",
            speed_and_average(torrent.download_speed, torrent.download_speed_avg),
        ),
        (
            "Upload Speed",
            speed_and_average(torrent.upload_speed, torrent.upload_speed_avg),
        ),
        (
            "Download Limit",
            format_speed_limit(limit_to_kbps(torrent.download_limit)),
        ),
        (
            "Upload Limit",
            format_speed_limit(limit_to_kbps(torrent.upload_limit)),
        ),
        (
            "Connections",
            format!("{} ({} max)", torrent.connections, torrent.connections_limit),
        ),
        (
            "Seeds",
            format!("{} ({} total)", torrent.seeds, torrent.total_seeds),
        ),
        (
            "Peers",
            format!("{} ({} total)", torrent.peers, torrent.total_peers),
        ),
    ]
}

/// Render a contents tree with checkbox glyphs from the selection.
#[must_use]
pub fn render_contents(tree: &ContentsTree, selection: Option<&SelectionMap>) -> String {
    let mut out = String::new();
    for (depth, node) in tree.iter_depth_first() {
        let view = selection.map_or(SelectionView::NotSelected, |selection| {
            selection.state_of(&node.item_path())
        });
        let suffix = if node.is_directory() { "/" } else { "" };
        let remaining = remaining_bytes(node);
        let _ = writeln!(
            out,
            "{:indent$}{} {}{suffix}  {}  {}  {}  {} left  {}",
            "",
            checkbox(view),
            node.name(),
            format_bytes(node.size()),
            format_percent(node.progress()),
            node.priority().map_or("-", |priority| priority.label()),
            format_bytes(remaining),
            availability_label(node.availability()),
            indent = depth * 2
        );
    }
    out
}

/// Availability as a percentage, `N/A` when unknown.
#[must_use]
pub fn availability_label(availability: f64) -> String {
    if availability < 0.0 {
        "N/A".to_string()
    } else {
        format_percent(availability)
    }
}

const fn checkbox(view: SelectionView) -> &'static str {
    match view {
        SelectionView::NotSelected => "[ ]",
        SelectionView::PartlySelected => "[-]",
        SelectionView::Selected => "[x]",
    }
}

fn limit_suffix(limit: i64) -> String {
    match limit_to_kbps(limit) {
        0 => String::new(),
        kbps => format!(" (Limit: {})", format_speed_limit(kbps)),
    }
}

fn date_label(date: Option<&DateTime<Utc>>) -> String {
    date.map_or_else(
        || "-".to_string(),
        |date| date.format("%a %b %d %Y %H:%M:%S").to_string(),
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn remaining_bytes(node: &ContentsNode) -> u64 {
    let left = node.size() as f64 * (1.0 - node.progress().clamp(0.0, 1.0));
    left.round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contents::ItemPath;
    use crate::store::Sequenced;
    use qbdash_api_models::{FilePriority, TorrentFile};

    #[test]
    fn list_renders_queue_state_and_limits() {
        let mut store = DashboardStore::new();
        store.apply_application_info(Sequenced::new(1, "qBittorrent v4.3.1".to_string()));
        store.apply_torrents(Sequenced::new(
            2,
            vec![Torrent {
                hash: "h".to_string(),
                name: "Ubuntu".to_string(),
                state: TorrentState::Downloading,
                priority: 1,
                size: 2_000_000,
                progress: 0.5,
                download_speed: 1_500,
                download_limit: 100_000,
                eta: 3_725,
                peers: 3,
                total_peers: 10,
                force_start: true,
                category: "linux".to_string(),
                tags: vec!["iso".to_string()],
                ..Torrent::default()
            }],
        ));

        let text = render_torrent_list(&store);
        assert!(text.starts_with("qBittorrent v4.3.1\n"));
        assert!(text.contains("  #1 Ubuntu  [F] Downloading"));
        assert!(text.contains("50.00%  2 MB  down 1.5 kB/s (Limit: 100 kB/s)"));
        assert!(text.contains("peers 3 (10)  1 hour, 2 minutes  [linux]  #iso"));
    }

    #[test]
    fn details_cover_info_and_transfer() -> anyhow::Result<()> {
        let torrent: Torrent = serde_json::from_value(serde_json::json!({
            "hash": "abc",
            "name": "Ubuntu",
            "state": 4,
            "size": 4_000_000,
            "bytesDownloaded": 4_000_000,
            "bytesDownloadedSession": 1_000_000,
            "bytesUploaded": 2_500,
            "savePath": "/downloads/",
            "addDate": "2024-01-02T03:04:05Z",
            "completionDate": "2024-01-03T00:00:00Z",
            "totalPieces": 4,
            "pieceSize": 1_000_000,
            "piecesDownloaded": 4,
            "createdBy": "mktorrent 1.1",
            "creatorComment": "release",
            "timeActive": 90_000,
            "uploadSpeed": 1_500,
            "uploadSpeedAvg": 500,
            "uploadLimit": 250_000,
            "downloadLimit": -1,
            "connections": 3,
            "connectionsLimit": 100,
            "seeds": 1,
            "totalSeeds": 20,
            "peers": 2,
            "totalPeers": 30
        }))?;

        let text = render_torrent_details(&torrent);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  Torrent Info");
        assert!(lines.contains(&"    Hash: abc"));
        assert!(lines.contains(&"    Added On: Tue Jan 02 2024 03:04:05"));
        assert!(lines.contains(&"    Pieces: 4 x 1 MB (4 downloaded)"));
        assert!(lines.contains(&"    Completed On: Wed Jan 03 2024 00:00:00"));
        assert!(lines.contains(&"    Created On: -"));
        assert!(lines.contains(&"  Transfer Info"));
        assert!(lines.contains(&"    Time Active: 1 day, 1 hour"));
        assert!(lines.contains(&"    ETA: Completed"));
        assert!(lines.contains(&"    Downloaded: 4 MB (1 MB this session)"));
        assert!(lines.contains(&"    Uploaded: 2.5 kB (0 B this session)"));
        assert!(lines.contains(&"    Upload Speed: 1.5 kB/s (500 B/s avg.)"));
        assert!(lines.contains(&"    Download Limit: No limit"));
        assert!(lines.contains(&"    Upload Limit: 250 kB/s"));
        assert!(lines.contains(&"    Connections: 3 (100 max)"));
        assert!(lines.contains(&"    Seeds: 1 (20 total)"));
        assert!(lines.contains(&"    Peers: 2 (30 total)"));
        Ok(())
    }

    #[test]
    fn details_mark_unfinished_downloads() {
        let torrent = Torrent {
            state: TorrentState::Downloading,
            size: 10,
            eta: 60,
            ..Torrent::default()
        };
        let text = render_torrent_details(&torrent);
        assert!(text.contains("    Completed On: Still downloading..\n"));
        assert!(text.contains("    Pieces: \n"));
        assert!(text.contains("    ETA: 1 minute\n"));
    }

    #[test]
    fn eta_reflects_state() {
        let mut torrent = Torrent {
            state: TorrentState::Paused,
            ..Torrent::default()
        };
        assert_eq!(eta_label(&torrent), "No ETA");
        torrent.state = TorrentState::Completed;
        assert_eq!(eta_label(&torrent), "Completed");
    }

    #[test]
    fn contents_render_indented_with_selection() {
        let files = vec![
            TorrentFile {
                name: "dir/a.bin".to_string(),
                priority: FilePriority::High,
                progress: 1.0,
                size: 1_000,
                availability: -1.0,
            },
            TorrentFile {
                name: "dir/b.bin".to_string(),
                priority: FilePriority::Normal,
                progress: 0.0,
                size: 3_000,
                availability: 0.5,
            },
        ];
        let tree = ContentsTree::build(&files);
        let mut selection = SelectionMap::default();
        selection.sync_files(&files);
        selection.select(&ItemPath::File("dir/a.bin".to_string()));

        let text = render_contents(&tree, Some(&selection));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[-] dir/  4 kB  25.00%  Mixed  3 kB left"));
        assert!(lines[1].starts_with("  [x] a.bin  1 kB  100.00%  High  0 B left  N/A"));
        assert!(lines[2].ends_with("50.00%"));
    }
}
