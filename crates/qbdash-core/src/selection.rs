//! Tri-state file selection for the contents tree.
//!
//! Selection is tracked per file path; directory state is derived from the
//! files below it on every query.

use std::collections::BTreeMap;

use qbdash_api_models::TorrentFile;

use crate::contents::ItemPath;

/// Selection state of a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileSelection {
    /// Explicitly selected.
    Selected,
    /// Explicitly deselected.
    Deselected,
    /// Never touched by the user.
    #[default]
    Unset,
}

/// Aggregated selection of a file or directory as shown by its checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionView {
    /// Nothing below the item is selected.
    NotSelected,
    /// Some, but not all, files below the item are selected.
    PartlySelected,
    /// Every file below the item is selected.
    Selected,
}

/// Selection state of every file in one torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMap {
    states: BTreeMap<String, FileSelection>,
}

impl SelectionMap {
    /// Track the given files: new paths start `Unset`, vanished paths are
    /// dropped, existing states are kept.
    pub fn sync_files(&mut self, files: &[TorrentFile]) {
        let mut next = BTreeMap::new();
        for file in files {
            let state = self.states.get(&file.name).copied().unwrap_or_default();
            next.insert(file.name.clone(), state);
        }
        self.states = next;
    }

    /// Mark the target file, or every file below the target directory, selected.
    pub fn select(&mut self, target: &ItemPath) {
        self.set(target, FileSelection::Selected);
    }

    /// Mark the target file, or every file below the target directory, deselected.
    pub fn deselect(&mut self, target: &ItemPath) {
        self.set(target, FileSelection::Deselected);
    }

    /// Flip the target: a fully selected item is deselected, anything else is
    /// selected.
    pub fn toggle(&mut self, target: &ItemPath) {
        if self.state_of(target) == SelectionView::Selected {
            self.deselect(target);
        } else {
            self.select(target);
        }
    }

    /// Checkbox state for the target.
    #[must_use]
    pub fn state_of(&self, target: &ItemPath) -> SelectionView {
        let (selected, unselected) = self
            .states
            .iter()
            .filter(|(path, _)| target.covers(path))
            .fold((0_usize, 0_usize), |(selected, unselected), (_, state)| {
                if *state == FileSelection::Selected {
                    (selected + 1, unselected)
                } else {
                    (selected, unselected + 1)
                }
            });

        match (selected, unselected) {
            (0, _) => SelectionView::NotSelected,
            (_, 0) => SelectionView::Selected,
            _ => SelectionView::PartlySelected,
        }
    }

    /// Raw state of a tracked file.
    #[must_use]
    pub fn file_state(&self, path: &str) -> Option<FileSelection> {
        self.states.get(path).copied()
    }

    /// Paths of selected files in lexical order.
    pub fn selected_files(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, state)| **state == FileSelection::Selected)
            .map(|(path, _)| path.as_str())
    }

    /// Whether any file is selected.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selected_files().next().is_some()
    }

    /// Reset every file to `Unset`.
    pub fn clear(&mut self) {
        for state in self.states.values_mut() {
            *state = FileSelection::Unset;
        }
    }

    fn set(&mut self, target: &ItemPath, value: FileSelection) {
        for (path, state) in &mut self.states {
            if target.covers(path) {
                *state = value;
            }
        }
    }
}

/// Items an action from `item`'s context menu applies to.
///
/// With a selection the action targets the selected files; without one it
/// targets the item itself, except that directories of completed torrents
/// offer nothing.
#[must_use]
pub fn action_targets(selection: &SelectionMap, item: &ItemPath, completed: bool) -> Vec<ItemPath> {
    if selection.has_selection() {
        return selection
            .selected_files()
            .map(|path| ItemPath::File(path.to_string()))
            .collect();
    }
    if item.is_directory() && completed {
        return Vec::new();
    }
    vec![item.clone()]
}

/// Entries of a contents context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMenu {
    /// Offer renaming.
    pub rename: bool,
    /// Offer the priority submenu.
    pub priority: bool,
}

impl ContextMenu {
    /// Menu for the given targets, `None` when nothing applies.
    #[must_use]
    pub fn for_targets(targets: &[ItemPath], completed: bool) -> Option<Self> {
        let rename = matches!(targets, [ItemPath::File(_)]);
        let priority = !completed && !targets.is_empty();
        (rename || priority).then_some(Self { rename, priority })
    }
}
