//! View-state store fed by the pollers.
//!
//! # Design
//! - Every fetch takes a sequence number before the request leaves; a reducer
//!   refuses a response older than the newest one already applied for the same
//!   concern, so a slow response can never roll the view back.
//! - Reducers take `&mut self` and run to completion; callers share the store
//!   behind a mutex.
//! - File lists and selections live only while their torrent is expanded.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use qbdash_api_models::{Category, Preferences, Torrent, TorrentFile};
use tracing::debug;

use crate::add::AddTorrentsForm;
use crate::contents::{ContentsTree, ItemPath};
use crate::list::sort_torrents;
use crate::selection::SelectionMap;

/// Monotonic request sequence number.
pub type Sequence = u64;

/// Issues sequence numbers to outgoing requests.
#[derive(Debug)]
pub struct SequenceCounter {
    next: AtomicU64,
}

impl SequenceCounter {
    /// New counter starting at `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Take the next number.
    pub fn issue(&self) -> Sequence {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A response tagged with the sequence number of its request.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    /// Sequence taken before the request was sent.
    pub sequence: Sequence,
    /// Decoded payload.
    pub value: T,
}

impl<T> Sequenced<T> {
    /// Tag a payload.
    pub const fn new(sequence: Sequence, value: T) -> Self {
        Self { sequence, value }
    }
}

/// Result of offering a response to a reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The store now reflects the response.
    Applied,
    /// A newer response was already applied; this one was discarded.
    Stale,
    /// Nobody is watching this torrent's files any more.
    Detached,
}

#[derive(Debug, Clone, Default)]
struct Slot<T> {
    sequence: Option<Sequence>,
    value: T,
}

impl<T> Slot<T> {
    fn offer(&mut self, incoming: Sequenced<T>) -> ApplyOutcome {
        if self
            .sequence
            .is_some_and(|current| incoming.sequence < current)
        {
            return ApplyOutcome::Stale;
        }
        self.sequence = Some(incoming.sequence);
        self.value = incoming.value;
        ApplyOutcome::Applied
    }
}

#[derive(Debug, Clone, Default)]
struct ExpandedTorrent {
    files: Slot<Vec<TorrentFile>>,
    selection: SelectionMap,
}

/// Last-known snapshots of everything the dashboard shows.
#[derive(Debug, Clone, Default)]
pub struct DashboardStore {
    application_info: Slot<Option<String>>,
    preferences: Slot<Option<Preferences>>,
    categories: Slot<Vec<Category>>,
    tags: Slot<Vec<String>>,
    torrents: Slot<Vec<Torrent>>,
    expanded: HashMap<String, ExpandedTorrent>,
    files_floor: HashMap<String, Sequence>,
    revision: u64,
}

impl DashboardStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter bumped on every applied change; renderers compare it to skip
    /// redundant frames.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Record the application name and version string.
    pub fn apply_application_info(&mut self, info: Sequenced<String>) -> ApplyOutcome {
        let outcome = self.application_info.offer(Sequenced::new(info.sequence, Some(info.value)));
        self.bump(outcome, "application_info")
    }

    /// Record daemon preferences.
    pub fn apply_preferences(&mut self, preferences: Sequenced<Preferences>) -> ApplyOutcome {
        let outcome = self
            .preferences
            .offer(Sequenced::new(preferences.sequence, Some(preferences.value)));
        self.bump(outcome, "preferences")
    }

    /// Record the category list.
    pub fn apply_categories(&mut self, categories: Sequenced<Vec<Category>>) -> ApplyOutcome {
        let outcome = self.categories.offer(categories);
        self.bump(outcome, "categories")
    }

    /// Record the known tags.
    pub fn apply_tags(&mut self, tags: Sequenced<Vec<String>>) -> ApplyOutcome {
        let outcome = self.tags.offer(tags);
        self.bump(outcome, "tags")
    }

    /// Record the torrent list, sorted by queue priority. Expanded torrents
    /// that disappeared are collapsed.
    pub fn apply_torrents(&mut self, torrents: Sequenced<Vec<Torrent>>) -> ApplyOutcome {
        let Sequenced {
            sequence,
            value: mut torrents,
        } = torrents;
        sort_torrents(&mut torrents);
        let outcome = self.torrents.offer(Sequenced::new(sequence, torrents));
        if outcome == ApplyOutcome::Applied {
            let known = &self.torrents.value;
            self.expanded
                .retain(|hash, _| known.iter().any(|torrent| &torrent.hash == hash));
            self.files_floor
                .retain(|hash, _| known.iter().any(|torrent| &torrent.hash == hash));
        }
        self.bump(outcome, "torrents")
    }

    /// Record the file list of an expanded torrent.
    pub fn apply_torrent_files(
        &mut self,
        hash: &str,
        files: Sequenced<Vec<TorrentFile>>,
    ) -> ApplyOutcome {
        let Some(expanded) = self.expanded.get_mut(hash) else {
            debug!(hash, sequence = files.sequence, "dropping files for collapsed torrent");
            return ApplyOutcome::Detached;
        };
        // The floor outlives collapse so a re-expanded torrent still refuses
        // responses older than the last one it showed.
        let floor = self.files_floor.get(hash).copied();
        if floor.is_some_and(|floor| files.sequence < floor) {
            return self.bump(ApplyOutcome::Stale, "torrent_files");
        }
        let sequence = files.sequence;
        let outcome = expanded.files.offer(files);
        if outcome == ApplyOutcome::Applied {
            expanded.selection.sync_files(&expanded.files.value);
            self.files_floor.insert(hash.to_string(), sequence);
        }
        self.bump(outcome, "torrent_files")
    }

    /// Start tracking a torrent's files. Returns `false` if already expanded.
    pub fn expand(&mut self, hash: &str) -> bool {
        if self.expanded.contains_key(hash) {
            return false;
        }
        self.expanded
            .insert(hash.to_string(), ExpandedTorrent::default());
        self.revision += 1;
        true
    }

    /// Stop tracking a torrent's files and forget them.
    pub fn collapse(&mut self, hash: &str) -> bool {
        let removed = self.expanded.remove(hash).is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Select a file or directory of an expanded torrent.
    pub fn select_item(&mut self, hash: &str, item: &ItemPath) {
        if let Some(expanded) = self.expanded.get_mut(hash) {
            expanded.selection.select(item);
            self.revision += 1;
        }
    }

    /// Deselect a file or directory of an expanded torrent.
    pub fn deselect_item(&mut self, hash: &str, item: &ItemPath) {
        if let Some(expanded) = self.expanded.get_mut(hash) {
            expanded.selection.deselect(item);
            self.revision += 1;
        }
    }

    /// Application name and version, once fetched.
    #[must_use]
    pub fn application_info(&self) -> Option<&str> {
        self.application_info.value.as_deref()
    }

    /// Daemon preferences, once fetched.
    #[must_use]
    pub const fn preferences(&self) -> Option<&Preferences> {
        self.preferences.value.as_ref()
    }

    /// Known categories.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories.value
    }

    /// Known tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags.value
    }

    /// Torrents in display order.
    #[must_use]
    pub fn torrents(&self) -> &[Torrent] {
        &self.torrents.value
    }

    /// Look up a torrent by hash.
    #[must_use]
    pub fn torrent(&self, hash: &str) -> Option<&Torrent> {
        self.torrents.value.iter().find(|torrent| torrent.hash == hash)
    }

    /// The listed hash matching `hash` without regard to ASCII case, or
    /// `hash` itself when no listed torrent matches.
    #[must_use]
    pub fn canonical_hash<'a>(&'a self, hash: &'a str) -> &'a str {
        self.torrents
            .value
            .iter()
            .find(|torrent| torrent.hash.eq_ignore_ascii_case(hash))
            .map_or(hash, |torrent| torrent.hash.as_str())
    }

    /// Add-torrents form seeded from the current preferences.
    #[must_use]
    pub fn add_torrents_form(&self) -> AddTorrentsForm {
        AddTorrentsForm::from_preferences(self.preferences())
    }

    /// Where the torrents of `form` will be saved, given the known
    /// preferences and categories.
    #[must_use]
    pub fn add_destination(&self, form: &AddTorrentsForm) -> String {
        form.destination(self.preferences(), self.categories())
    }

    /// Whether the torrent's files are being tracked.
    #[must_use]
    pub fn is_expanded(&self, hash: &str) -> bool {
        self.expanded.contains_key(hash)
    }

    /// Hashes of expanded torrents in lexical order.
    #[must_use]
    pub fn expanded_hashes(&self) -> BTreeSet<&str> {
        self.expanded.keys().map(String::as_str).collect()
    }

    /// Last file list of an expanded torrent.
    #[must_use]
    pub fn files(&self, hash: &str) -> Option<&[TorrentFile]> {
        self.expanded
            .get(hash)
            .filter(|expanded| expanded.files.sequence.is_some())
            .map(|expanded| expanded.files.value.as_slice())
    }

    /// Contents tree of an expanded torrent, rebuilt from its file list.
    #[must_use]
    pub fn contents_tree(&self, hash: &str) -> Option<ContentsTree> {
        self.files(hash).map(ContentsTree::build)
    }

    /// Selection of an expanded torrent.
    #[must_use]
    pub fn selection(&self, hash: &str) -> Option<&SelectionMap> {
        self.expanded.get(hash).map(|expanded| &expanded.selection)
    }

    /// Known tags the torrent does not carry yet.
    #[must_use]
    pub fn available_tags(&self, hash: &str) -> Vec<&str> {
        let Some(torrent) = self.torrent(hash) else {
            return Vec::new();
        };
        self.tags
            .value
            .iter()
            .map(String::as_str)
            .filter(|tag| !tag.is_empty() && !torrent.tag_names().any(|own| own == *tag))
            .collect()
    }

    fn bump(&mut self, outcome: ApplyOutcome, concern: &'static str) -> ApplyOutcome {
        match outcome {
            ApplyOutcome::Applied => self.revision += 1,
            ApplyOutcome::Stale => debug!(concern, "discarding stale response"),
            ApplyOutcome::Detached => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbdash_api_models::FilePriority;

    fn torrent(hash: &str, priority: u32) -> Torrent {
        Torrent {
            hash: hash.to_string(),
            name: hash.to_uppercase(),
            priority,
            ..Torrent::default()
        }
    }

    fn file(name: &str, size: u64) -> TorrentFile {
        TorrentFile {
            name: name.to_string(),
            priority: FilePriority::Normal,
            progress: 0.0,
            size,
            availability: 1.0,
        }
    }

    #[test]
    fn older_torrent_snapshot_never_overwrites_newer() {
        let mut store = DashboardStore::new();
        assert_eq!(
            store.apply_torrents(Sequenced::new(5, vec![torrent("new", 1)])),
            ApplyOutcome::Applied
        );
        assert_eq!(
            store.apply_torrents(Sequenced::new(3, vec![torrent("old", 1)])),
            ApplyOutcome::Stale
        );
        assert_eq!(store.torrents().len(), 1);
        assert_eq!(store.torrents()[0].hash, "new");
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn torrents_are_sorted_on_apply() {
        let mut store = DashboardStore::new();
        store.apply_torrents(Sequenced::new(
            1,
            vec![torrent("a", 0), torrent("b", 3), torrent("c", 1)],
        ));
        let order: Vec<_> = store.torrents().iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![1, 3, 0]);
        assert_eq!(store.torrent("b").map(|t| t.priority), Some(3));
    }

    #[test]
    fn files_apply_only_while_expanded() {
        let mut store = DashboardStore::new();
        store.apply_torrents(Sequenced::new(1, vec![torrent("h", 1)]));

        assert_eq!(
            store.apply_torrent_files("h", Sequenced::new(2, vec![file("a/b", 4)])),
            ApplyOutcome::Detached
        );

        assert!(store.expand("h"));
        assert!(!store.expand("h"));
        assert!(store.files("h").is_none());
        assert_eq!(
            store.apply_torrent_files("h", Sequenced::new(4, vec![file("a/b", 4)])),
            ApplyOutcome::Applied
        );
        assert_eq!(
            store.apply_torrent_files("h", Sequenced::new(3, vec![])),
            ApplyOutcome::Stale
        );
        let tree = store.contents_tree("h").expect("tree for expanded torrent");
        assert_eq!(tree.root().size(), 4);

        store.select_item("h", &ItemPath::Directory("a/".to_string()));
        let selection = store.selection("h").expect("selection tracked");
        assert_eq!(selection.selected_files().collect::<Vec<_>>(), vec!["a/b"]);

        assert!(store.collapse("h"));
        assert!(!store.is_expanded("h"));
    }

    #[test]
    fn files_floor_survives_collapse_and_expand() {
        let mut store = DashboardStore::new();
        store.apply_torrents(Sequenced::new(1, vec![torrent("h", 1)]));
        store.expand("h");
        assert_eq!(
            store.apply_torrent_files("h", Sequenced::new(10, vec![file("new", 1)])),
            ApplyOutcome::Applied
        );

        store.collapse("h");
        store.expand("h");
        assert_eq!(
            store.apply_torrent_files("h", Sequenced::new(8, vec![file("old", 1)])),
            ApplyOutcome::Stale
        );
        assert!(store.files("h").is_none());
        assert_eq!(
            store.apply_torrent_files("h", Sequenced::new(11, vec![file("newer", 1)])),
            ApplyOutcome::Applied
        );
        let names: Vec<&str> = store
            .files("h")
            .unwrap_or_default()
            .iter()
            .map(|file| file.name.as_str())
            .collect();
        assert_eq!(names, vec!["newer"]);
    }

    #[test]
    fn hashes_resolve_without_regard_to_case() {
        let mut store = DashboardStore::new();
        store.apply_torrents(Sequenced::new(1, vec![torrent("ABCDEF", 1)]));
        assert_eq!(store.canonical_hash("abcdef"), "ABCDEF");
        assert_eq!(store.canonical_hash("missing"), "missing");
    }

    #[test]
    fn add_form_follows_known_preferences_and_categories() {
        let mut store = DashboardStore::new();
        store.apply_preferences(Sequenced::new(
            1,
            Preferences {
                save_path: "/downloads/".to_string(),
                start_paused_enabled: true,
                ..Preferences::default()
            },
        ));
        store.apply_categories(Sequenced::new(
            2,
            vec![Category {
                name: "movies".to_string(),
                save_path: "/media/movies".to_string(),
            }],
        ));

        let mut form = store.add_torrents_form();
        assert_eq!(form.save_path, "/downloads/");
        assert!(!form.start_torrent);
        assert_eq!(store.add_destination(&form), "/downloads/");

        form.auto_manage = true;
        form.category = "movies".to_string();
        assert_eq!(store.add_destination(&form), "/media/movies");
        form.category = "tv".to_string();
        assert_eq!(store.add_destination(&form), "/downloads/tv");
    }

    #[test]
    fn vanished_torrents_are_collapsed() {
        let mut store = DashboardStore::new();
        store.apply_torrents(Sequenced::new(1, vec![torrent("a", 1), torrent("b", 2)]));
        store.expand("a");
        store.expand("b");

        store.apply_torrents(Sequenced::new(2, vec![torrent("b", 1)]));
        assert_eq!(store.expanded_hashes().into_iter().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn available_tags_exclude_assigned_ones() {
        let mut store = DashboardStore::new();
        let mut tagged = torrent("t", 1);
        tagged.tags = vec!["linux".to_string()];
        store.apply_torrents(Sequenced::new(1, vec![tagged]));
        store.apply_tags(Sequenced::new(
            2,
            vec!["linux".to_string(), "iso".to_string()],
        ));

        assert_eq!(store.available_tags("t"), vec!["iso"]);
        assert!(store.available_tags("missing").is_empty());
    }

    #[test]
    fn static_snapshots_are_sequenced_independently() {
        let mut store = DashboardStore::new();
        store.apply_application_info(Sequenced::new(9, "qBittorrent v4.3.1".to_string()));
        store.apply_preferences(Sequenced::new(
            1,
            Preferences {
                save_path: "/downloads/".to_string(),
                ..Preferences::default()
            },
        ));
        assert_eq!(
            store.apply_application_info(Sequenced::new(2, "stale".to_string())),
            ApplyOutcome::Stale
        );
        assert_eq!(store.application_info(), Some("qBittorrent v4.3.1"));
        assert_eq!(
            store.preferences().map(|prefs| prefs.save_path.as_str()),
            Some("/downloads/")
        );

        let counter = SequenceCounter::new();
        let first = counter.issue();
        assert!(counter.issue() > first);
    }
}
