//! User intents turned into backend commands.
//!
//! # Design
//! - Each intent issues the documented POST at most once per target; nothing
//!   is retried and the store is never updated optimistically.
//! - Prompt answers arrive as `Option`; a dismissed or unchanged answer is a
//!   skip, never an error.
//! - Outcomes that the user should see go through the [`EventBus`]; the rest
//!   are logged at `debug` and dropped.

use std::sync::Arc;

use futures_util::future::join_all;
use qbdash_api_models::{FilePriority, Torrent, TorrentFile};
use qbdash_core::logic::{
    changed_text, leaf_name, plan_file_rename, plan_speed_limit, resolve_priority_ids,
};
use qbdash_core::{AddTorrentsForm, ItemPath};
use qbdash_events::EventBus;
use tracing::debug;

use crate::api::{DashboardCommands, LimitDirection, TorrentCommand};
use crate::error::{ClientError, ClientResult};

/// What happened to a dispatched intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Every request was accepted by the backend.
    Sent,
    /// Nothing to do: cancelled, unchanged, or no matching targets.
    Skipped,
    /// Refused before sending: invalid input or a torrent in a state that
    /// accepts no commands.
    Rejected,
    /// At least one request failed.
    Failed,
}

/// Queue moves offered by the torrent menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMove {
    /// Top of the queue.
    Top,
    /// Bottom of the queue.
    Bottom,
    /// One place up.
    Up,
    /// One place down.
    Down,
}

impl QueueMove {
    const fn command(self) -> TorrentCommand {
        match self {
            Self::Top => TorrentCommand::MaxPriority,
            Self::Bottom => TorrentCommand::MinPriority,
            Self::Up => TorrentCommand::IncreasePriority,
            Self::Down => TorrentCommand::DecreasePriority,
        }
    }
}

/// Dispatches user intents to the backend and reports results on the bus.
#[derive(Clone)]
pub struct ActionDispatcher {
    api: Arc<dyn DashboardCommands>,
    events: EventBus,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    /// Dispatcher publishing to `events`.
    #[must_use]
    pub fn new(api: Arc<dyn DashboardCommands>, events: EventBus) -> Self {
        Self { api, events }
    }

    /// Bus the dispatcher reports to.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Pause a running torrent, or resume a paused or completed one.
    pub async fn toggle_pause(&self, torrent: &Torrent) -> ActionOutcome {
        if let Some(outcome) = refuse_locked(torrent, "toggle_pause") {
            return outcome;
        }
        let command = if torrent.state.is_paused_like() {
            TorrentCommand::Resume
        } else {
            TorrentCommand::Pause
        };
        swallow(
            "toggle_pause",
            self.api.torrent_command(&torrent.hash, command).await,
        )
    }

    /// Delete after confirmation; `Some(true)` also removes downloaded data.
    pub async fn delete(&self, torrent: &Torrent, confirmed: Option<bool>) -> ActionOutcome {
        if let Some(outcome) = refuse_locked(torrent, "delete") {
            return outcome;
        }
        let Some(delete_files) = confirmed else {
            return ActionOutcome::Skipped;
        };
        match self.api.delete_torrent(&torrent.hash, delete_files).await {
            Ok(()) => {
                self.events.notify(
                    "Torrent Deleted",
                    format!("The torrent '{}' has been deleted!", torrent.name),
                );
                ActionOutcome::Sent
            }
            Err(err) => swallow("delete", Err(err)),
        }
    }

    /// Move the torrent's data to the answered path.
    pub async fn set_save_path(&self, torrent: &Torrent, answer: Option<&str>) -> ActionOutcome {
        if let Some(outcome) = refuse_locked(torrent, "set_save_path") {
            return outcome;
        }
        let Some(save_path) = changed_text(&torrent.save_path, answer) else {
            return ActionOutcome::Skipped;
        };
        match self.api.set_save_path(&torrent.hash, save_path).await {
            Ok(()) => {
                self.events.notify(
                    "Torrent Moved",
                    format!(
                        "The torrent '{}' has been moved to '{save_path}'!",
                        torrent.name
                    ),
                );
                ActionOutcome::Sent
            }
            Err(err) => self.alert("set_save_path", "Change Save Path", "Invalid save path!", &err),
        }
    }

    /// Rename the torrent to the answered name.
    pub async fn rename(&self, torrent: &Torrent, answer: Option<&str>) -> ActionOutcome {
        if let Some(outcome) = refuse_locked(torrent, "rename") {
            return outcome;
        }
        let Some(name) = changed_text(&torrent.name, answer) else {
            return ActionOutcome::Skipped;
        };
        match self.api.set_name(&torrent.hash, name).await {
            Ok(()) => {
                self.events.notify(
                    "Torrent Renamed",
                    format!(
                        "The torrent '{}' has been renamed to '{name}'!",
                        torrent.name
                    ),
                );
                ActionOutcome::Sent
            }
            Err(err) => self.alert("rename", "Rename", "Invalid name!", &err),
        }
    }

    /// Set the download cap from a kB/s answer.
    pub async fn set_download_limit(&self, torrent: &Torrent, answer: Option<&str>) -> ActionOutcome {
        self.set_limit(torrent, LimitDirection::Download, answer)
            .await
    }

    /// Set the upload cap from a kB/s answer.
    pub async fn set_upload_limit(&self, torrent: &Torrent, answer: Option<&str>) -> ActionOutcome {
        self.set_limit(torrent, LimitDirection::Upload, answer).await
    }

    async fn set_limit(
        &self,
        torrent: &Torrent,
        direction: LimitDirection,
        answer: Option<&str>,
    ) -> ActionOutcome {
        let (operation, title, current) = match direction {
            LimitDirection::Download => (
                "set_download_limit",
                "Set Download Limit",
                torrent.download_limit,
            ),
            LimitDirection::Upload => ("set_upload_limit", "Set Upload Limit", torrent.upload_limit),
        };
        if let Some(outcome) = refuse_locked(torrent, operation) {
            return outcome;
        }
        let limit = match plan_speed_limit(current, answer) {
            Ok(Some(limit)) => limit,
            Ok(None) => return ActionOutcome::Skipped,
            Err(source) => {
                let err = ClientError::validation(operation, source);
                return self.alert(operation, title, "Invalid limit!", &err);
            }
        };
        match self.api.set_limit(&torrent.hash, direction, limit).await {
            Ok(()) => ActionOutcome::Sent,
            Err(err) => self.alert(operation, title, "Invalid limit!", &err),
        }
    }

    /// Move the torrent within the download queue.
    pub async fn queue(&self, torrent: &Torrent, movement: QueueMove) -> ActionOutcome {
        if let Some(outcome) = refuse_locked(torrent, "queue") {
            return outcome;
        }
        swallow(
            "queue",
            self.api
                .torrent_command(&torrent.hash, movement.command())
                .await,
        )
    }

    /// Attach tags; an empty list is a skip.
    pub async fn add_tags(&self, hash: &str, tags: &[String]) -> ActionOutcome {
        if tags.is_empty() {
            return ActionOutcome::Skipped;
        }
        swallow("add_tags", self.api.add_tags(hash, tags).await)
    }

    /// Detach tags; an empty list is a skip.
    pub async fn remove_tags(&self, hash: &str, tags: &[String]) -> ActionOutcome {
        if tags.is_empty() {
            return ActionOutcome::Skipped;
        }
        swallow("remove_tags", self.api.remove_tags(hash, tags).await)
    }

    /// Assign a category; `""` clears it.
    pub async fn set_category(&self, torrent: &Torrent, category: &str) -> ActionOutcome {
        if torrent.category == category {
            return ActionOutcome::Skipped;
        }
        swallow(
            "set_category",
            self.api.set_category(&torrent.hash, category).await,
        )
    }

    /// Apply `priority` to every file covered by `targets` that differs from it.
    pub async fn set_files_priority(
        &self,
        hash: &str,
        files: &[TorrentFile],
        targets: &[ItemPath],
        priority: FilePriority,
    ) -> ActionOutcome {
        let ids = match resolve_priority_ids(files, targets, priority) {
            Ok(ids) => ids,
            Err(source) => {
                let err = ClientError::validation("set_files_priority", source);
                debug!(hash, error = %err, detail = ?err, "file priority rejected");
                return ActionOutcome::Rejected;
            }
        };
        if ids.is_empty() {
            return ActionOutcome::Skipped;
        }
        swallow(
            "set_files_priority",
            self.api.set_files_priority(hash, &ids, priority).await,
        )
    }

    /// Rename the final segment of `path` for every file with that exact name.
    pub async fn rename_file(
        &self,
        hash: &str,
        files: &[TorrentFile],
        path: &str,
        answer: Option<&str>,
    ) -> ActionOutcome {
        let Some((ids, name)) = plan_file_rename(files, path, answer) else {
            return ActionOutcome::Skipped;
        };
        let old_name = leaf_name(path);
        let results = join_all(
            ids.iter()
                .map(|id| self.api.rename_file(hash, *id, name)),
        )
        .await;

        let mut outcome = ActionOutcome::Sent;
        for result in results {
            match result {
                Ok(()) => {
                    self.events.notify(
                        "File Renamed",
                        format!("The file '{old_name}' has been renamed to '{name}'!"),
                    );
                }
                Err(err) => {
                    outcome = self.alert("rename_file", "Rename File", "Invalid name!", &err);
                }
            }
        }
        outcome
    }

    /// Submit the add-torrents form.
    pub async fn add_torrents(&self, form: &AddTorrentsForm) -> ActionOutcome {
        let request = match form.to_request() {
            Ok(request) => request,
            Err(source) => {
                let err = ClientError::validation("add_torrents", source);
                return self.alert("add_torrents", "Add Torrents", "Invalid torrents!", &err);
            }
        };
        let count = form.files.len() + form.links().count();
        match self.api.add_torrents(&request).await {
            Ok(()) => {
                self.events.notify(
                    "Torrents Added",
                    format!("{count} torrent(s) have been added!"),
                );
                ActionOutcome::Sent
            }
            Err(err) => self.alert("add_torrents", "Add Torrents", "Invalid torrents!", &err),
        }
    }

    fn alert(
        &self,
        operation: &'static str,
        title: &str,
        body: &str,
        err: &ClientError,
    ) -> ActionOutcome {
        debug!(operation, error = %err, detail = ?err, "action failed");
        self.events.alert(title, body);
        match err {
            ClientError::Validation { .. } => ActionOutcome::Rejected,
            _ => ActionOutcome::Failed,
        }
    }
}

fn refuse_locked(torrent: &Torrent, operation: &'static str) -> Option<ActionOutcome> {
    torrent.state.actions_disabled().then(|| {
        debug!(
            operation,
            hash = %torrent.hash,
            state = torrent.state.label(),
            "torrent accepts no commands in this state"
        );
        ActionOutcome::Rejected
    })
}

fn swallow(operation: &'static str, result: ClientResult<()>) -> ActionOutcome {
    match result {
        Ok(()) => ActionOutcome::Sent,
        Err(err) => {
            debug!(operation, error = %err, detail = ?err, "action failed");
            ActionOutcome::Failed
        }
    }
}
