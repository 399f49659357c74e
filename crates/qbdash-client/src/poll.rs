//! Background refresh of the view-state store.
//!
//! # Design
//! - One task per concern: the torrent list, and the file list of each
//!   expanded torrent. Dropping a [`PollHandle`] aborts its task.
//! - Each tick spawns its request so a slow response never delays the next
//!   tick. The sequence number is taken before the request leaves and the
//!   store discards anything older than what it already holds.
//! - Poll failures are logged at `debug` and otherwise ignored; the next tick
//!   is the retry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use qbdash_core::{ApplyOutcome, DashboardStore, Sequence, SequenceCounter, Sequenced};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use crate::api::DashboardQueries;
use crate::error::ClientResult;

/// Store handle shared between pollers, dispatch callers and renderers.
pub type SharedStore = Arc<Mutex<DashboardStore>>;

/// Fetches snapshots and feeds them to the store.
#[derive(Clone)]
pub struct Poller {
    api: Arc<dyn DashboardQueries>,
    store: SharedStore,
    sequences: Arc<SequenceCounter>,
    changes: Arc<watch::Sender<u64>>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("revision", &*self.changes.borrow())
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Poller writing into `store`.
    #[must_use]
    pub fn new(api: Arc<dyn DashboardQueries>, store: SharedStore) -> Self {
        let revision = lock(&store).revision();
        let (changes, _) = watch::channel(revision);
        Self {
            api,
            store,
            sequences: Arc::new(SequenceCounter::new()),
            changes: Arc::new(changes),
        }
    }

    /// The shared store.
    #[must_use]
    pub const fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Receiver that observes the store revision after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Run `reducer` against the store and announce the new revision if it
    /// changed.
    pub fn update<R>(&self, reducer: impl FnOnce(&mut DashboardStore) -> R) -> R {
        let (result, before, after) = {
            let mut store = lock(&self.store);
            let before = store.revision();
            let result = reducer(&mut *store);
            (result, before, store.revision())
        };
        if after != before {
            self.changes.send_replace(after);
        }
        result
    }

    /// Read from the store without mutating it.
    pub fn read<R>(&self, reader: impl FnOnce(&DashboardStore) -> R) -> R {
        reader(&*lock(&self.store))
    }

    /// Fetch the snapshots that only change on daemon restart: application
    /// name, preferences, categories and tags.
    pub async fn load_snapshots(&self) {
        tokio::join!(
            self.refresh_application_name(),
            self.refresh_preferences(),
            self.refresh_categories(),
            self.refresh_tags(),
        );
    }

    /// Refresh the application name; `None` when the request failed.
    pub async fn refresh_application_name(&self) -> Option<ApplyOutcome> {
        let sequence = self.sequences.issue();
        let name = fetch("application_name", sequence, self.api.application_name()).await?;
        Some(self.update(|store| store.apply_application_info(Sequenced::new(sequence, name))))
    }

    /// Refresh preferences; `None` when the request failed.
    pub async fn refresh_preferences(&self) -> Option<ApplyOutcome> {
        let sequence = self.sequences.issue();
        let preferences = fetch("preferences", sequence, self.api.preferences()).await?;
        Some(self.update(|store| store.apply_preferences(Sequenced::new(sequence, preferences))))
    }

    /// Refresh categories; `None` when the request failed.
    pub async fn refresh_categories(&self) -> Option<ApplyOutcome> {
        let sequence = self.sequences.issue();
        let categories = fetch("categories", sequence, self.api.categories()).await?;
        Some(self.update(|store| store.apply_categories(Sequenced::new(sequence, categories))))
    }

    /// Refresh tags; `None` when the request failed.
    pub async fn refresh_tags(&self) -> Option<ApplyOutcome> {
        let sequence = self.sequences.issue();
        let tags = fetch("tags", sequence, self.api.tags()).await?;
        Some(self.update(|store| store.apply_tags(Sequenced::new(sequence, tags))))
    }

    /// Refresh the torrent list; `None` when the request failed.
    pub async fn refresh_torrents(&self) -> Option<ApplyOutcome> {
        let sequence = self.sequences.issue();
        let torrents = fetch("torrents", sequence, self.api.torrents()).await?;
        Some(self.update(|store| store.apply_torrents(Sequenced::new(sequence, torrents))))
    }

    /// Refresh one torrent's files; `None` when the request failed.
    pub async fn refresh_files(&self, hash: &str) -> Option<ApplyOutcome> {
        let sequence = self.sequences.issue();
        let files = fetch("torrent_files", sequence, self.api.torrent_files(hash)).await?;
        Some(self.update(|store| store.apply_torrent_files(hash, Sequenced::new(sequence, files))))
    }

    /// Poll the torrent list every `period`.
    #[must_use]
    pub fn spawn_torrents(&self, period: Duration) -> PollHandle {
        let poller = self.clone();
        PollHandle::spawn("torrents", period, move || {
            let poller = poller.clone();
            async move {
                poller.refresh_torrents().await;
            }
        })
    }

    /// Poll the file list of `hash` every `period`.
    #[must_use]
    pub fn spawn_files(&self, hash: String, period: Duration) -> PollHandle {
        let poller = self.clone();
        PollHandle::spawn("torrent_files", period, move || {
            let poller = poller.clone();
            let hash = hash.clone();
            async move {
                poller.refresh_files(&hash).await;
            }
        })
    }
}

async fn fetch<T>(
    concern: &'static str,
    sequence: Sequence,
    request: impl Future<Output = ClientResult<T>>,
) -> Option<T> {
    match request.await {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(concern, sequence, error = %err, detail = ?err, "poll failed");
            None
        }
    }
}

fn lock(store: &SharedStore) -> MutexGuard<'_, DashboardStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running poll loop; dropping the handle stops it.
#[derive(Debug)]
pub struct PollHandle {
    concern: &'static str,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn spawn<F, Fut>(concern: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                trace!(concern, "poll tick");
                tokio::spawn(tick());
            }
        });
        Self { concern, task }
    }

    /// Concern this loop refreshes.
    #[must_use]
    pub const fn concern(&self) -> &'static str {
        self.concern
    }

    /// Whether the loop has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// File pollers for the torrents the user has expanded.
#[derive(Debug)]
pub struct FileWatchers {
    poller: Poller,
    period: Duration,
    handles: HashMap<String, PollHandle>,
}

impl FileWatchers {
    /// Watchers polling every `period`.
    #[must_use]
    pub fn new(poller: Poller, period: Duration) -> Self {
        Self {
            poller,
            period,
            handles: HashMap::new(),
        }
    }

    /// Expand a torrent and start polling its files. `hash` may differ in
    /// case from the listed one. Returns `false` when it was already watched.
    pub fn expand(&mut self, hash: &str) -> bool {
        let hash = self
            .poller
            .read(|store| store.canonical_hash(hash).to_string());
        if self.handles.contains_key(&hash) {
            return false;
        }
        self.poller.update(|store| store.expand(&hash));
        let handle = self.poller.spawn_files(hash.clone(), self.period);
        debug!(hash = %hash, "watching files");
        self.handles.insert(hash, handle);
        true
    }

    /// Stop polling a torrent's files and drop them from the store.
    pub fn collapse(&mut self, hash: &str) -> bool {
        let removed = self.handles.remove(hash).is_some();
        self.poller.update(|store| store.collapse(hash));
        if removed {
            debug!(hash, "stopped watching files");
        }
        removed
    }

    /// Expand when collapsed, collapse when expanded. Returns whether the
    /// torrent is expanded afterwards.
    pub fn toggle(&mut self, hash: &str) -> bool {
        if self.handles.contains_key(hash) {
            self.collapse(hash);
            false
        } else {
            self.expand(hash)
        }
    }

    /// Stop watchers for torrents the store no longer considers expanded,
    /// e.g. after they vanished from the torrent list.
    pub fn prune(&mut self) -> usize {
        let before = self.handles.len();
        let expanded: Vec<String> = self.poller.read(|store| {
            store
                .expanded_hashes()
                .into_iter()
                .map(str::to_string)
                .collect()
        });
        self.handles
            .retain(|hash, _| expanded.iter().any(|candidate| candidate == hash));
        before - self.handles.len()
    }

    /// Hashes currently watched.
    pub fn watched(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }
}
