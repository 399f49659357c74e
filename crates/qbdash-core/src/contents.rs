//! Torrent contents tree built from the flat file list.
//!
//! # Design
//! - The tree is rebuilt from scratch for every render; node identity across
//!   rebuilds is the path string only.
//! - Directory statistics are size-weighted aggregates of their children, so a
//!   directory never reports progress the bytes on disk cannot back.
//! - Children keep insertion order; directories are listed before files.

use std::collections::HashMap;

use qbdash_api_models::{FilePriority, TorrentFile};
use tracing::warn;

/// Split a file name on runs of `/` or `\`, dropping empty segments.
pub fn split_path(name: &str) -> impl Iterator<Item = &str> {
    name.split(['/', '\\']).filter(|segment| !segment.is_empty())
}

/// Reference to an entry of the contents tree by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemPath {
    /// A file, addressed by its full name as reported by the daemon.
    File(String),
    /// A directory, addressed by its tree path (`a/b/`, root is empty).
    Directory(String),
}

impl ItemPath {
    /// Path string of the item.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::File(path) | Self::Directory(path) => path,
        }
    }

    /// Whether the item is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Whether `file_name` is this file or lies below this directory.
    #[must_use]
    pub fn covers(&self, file_name: &str) -> bool {
        match self {
            Self::File(path) => path == file_name,
            Self::Directory(path) => {
                let mut file_segments = split_path(file_name);
                let prefix_matches = split_path(path).all(|dir_segment| {
                    file_segments
                        .next()
                        .is_some_and(|segment| segment == dir_segment)
                });
                prefix_matches && file_segments.next().is_some()
            }
        }
    }
}

/// Aggregated directory node.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryNode {
    name: String,
    path: String,
    size: u64,
    progress: f64,
    availability: f64,
    priority: Option<FilePriority>,
    children: Vec<ContentsNode>,
    index: HashMap<String, usize>,
}

/// Leaf node wrapping a daemon file entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    name: String,
    id: usize,
    file: TorrentFile,
}

/// Node of the contents tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentsNode {
    /// Directory aggregating its children.
    Directory(DirectoryNode),
    /// Single file.
    File(FileNode),
}

impl DirectoryNode {
    fn new(name: String, path: String) -> Self {
        Self {
            name,
            path,
            size: 0,
            progress: 0.0,
            availability: 0.0,
            priority: None,
            children: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Final path segment; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tree path with a trailing `/`; empty for the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sum of child sizes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Size-weighted progress of the children.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Size-weighted availability of the children.
    #[must_use]
    pub const fn availability(&self) -> f64 {
        self.availability
    }

    /// Common child priority, `Mixed` when children disagree, `None` when empty.
    #[must_use]
    pub const fn priority(&self) -> Option<FilePriority> {
        self.priority
    }

    /// Children with directories first, insertion order otherwise.
    pub fn children(&self) -> impl Iterator<Item = &ContentsNode> {
        let directories = self.children.iter().filter(|node| node.is_directory());
        let files = self.children.iter().filter(|node| !node.is_directory());
        directories.chain(files)
    }

    fn child_directory(&mut self, segment: &str) -> Option<&mut Self> {
        let position = match self.index.get(segment) {
            Some(position) => *position,
            None => {
                let path = format!("{}{segment}/", self.path);
                self.children.push(ContentsNode::Directory(Self::new(
                    segment.to_string(),
                    path,
                )));
                let position = self.children.len() - 1;
                self.index.insert(segment.to_string(), position);
                position
            }
        };
        match self.children.get_mut(position) {
            Some(ContentsNode::Directory(directory)) => Some(directory),
            _ => None,
        }
    }

    fn attach_file(&mut self, node: FileNode) -> bool {
        match self.index.get(&node.name) {
            Some(position) => match self.children.get_mut(*position) {
                Some(existing) if !existing.is_directory() => {
                    *existing = ContentsNode::File(node);
                    true
                }
                _ => false,
            },
            None => {
                self.index.insert(node.name.clone(), self.children.len());
                self.children.push(ContentsNode::File(node));
                true
            }
        }
    }

    fn aggregate(&mut self) {
        for child in &mut self.children {
            if let ContentsNode::Directory(directory) = child {
                directory.aggregate();
            }
        }

        self.size = self.children.iter().map(ContentsNode::size).sum();
        self.priority = None;
        for priority in self.children.iter().filter_map(ContentsNode::priority) {
            self.priority = match self.priority {
                None => Some(priority),
                Some(current) if current == priority => Some(current),
                Some(_) => Some(FilePriority::Mixed),
            };
        }

        if self.size == 0 {
            self.progress = 0.0;
            self.availability = 0.0;
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let total = self.size as f64;
        let (progress, availability) =
            self.children
                .iter()
                .fold((0.0, 0.0), |(progress, availability), child| {
                    #[allow(clippy::cast_precision_loss)]
                    let weight = child.size() as f64 / total;
                    (
                        weight.mul_add(child.progress(), progress),
                        weight.mul_add(child.availability(), availability),
                    )
                });
        self.progress = progress;
        self.availability = availability;
    }

    fn find(&self, segments: &[&str]) -> Option<&ContentsNode> {
        let (first, rest) = segments.split_first()?;
        let child = self.children.get(*self.index.get(*first)?)?;
        if rest.is_empty() {
            return Some(child);
        }
        match child {
            ContentsNode::Directory(directory) => directory.find(rest),
            ContentsNode::File(_) => None,
        }
    }

    fn collect<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a ContentsNode)>) {
        for child in self.children() {
            out.push((depth, child));
            if let ContentsNode::Directory(directory) = child {
                directory.collect(depth + 1, out);
            }
        }
    }

    fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                ContentsNode::Directory(directory) => directory.file_count(),
                ContentsNode::File(_) => 1,
            })
            .sum()
    }
}

impl FileNode {
    /// Final path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the file in the daemon's file list.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Underlying daemon entry.
    #[must_use]
    pub const fn file(&self) -> &TorrentFile {
        &self.file
    }
}

impl ContentsNode {
    /// Display name of the node.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(directory) => directory.name(),
            Self::File(file) => file.name(),
        }
    }

    /// Whether the node is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        match self {
            Self::Directory(directory) => directory.size,
            Self::File(file) => file.file.size,
        }
    }

    /// Completion ratio.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        match self {
            Self::Directory(directory) => directory.progress,
            Self::File(file) => file.file.progress,
        }
    }

    /// Swarm availability; negative when unknown.
    #[must_use]
    pub const fn availability(&self) -> f64 {
        match self {
            Self::Directory(directory) => directory.availability,
            Self::File(file) => file.file.availability,
        }
    }

    /// Priority, `None` only for an empty directory.
    #[must_use]
    pub const fn priority(&self) -> Option<FilePriority> {
        match self {
            Self::Directory(directory) => directory.priority,
            Self::File(file) => Some(file.file.priority),
        }
    }

    /// Path handle used by selection and actions.
    #[must_use]
    pub fn item_path(&self) -> ItemPath {
        match self {
            Self::Directory(directory) => ItemPath::Directory(directory.path.clone()),
            Self::File(file) => ItemPath::File(file.file.name.clone()),
        }
    }
}

/// Nested view of a torrent's files.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentsTree {
    root: DirectoryNode,
}

impl ContentsTree {
    /// Build the tree from the daemon's ordered file list.
    #[must_use]
    pub fn build(files: &[TorrentFile]) -> Self {
        let mut root = DirectoryNode::new(String::new(), String::new());

        for (id, file) in files.iter().enumerate() {
            let segments: Vec<&str> = split_path(&file.name).collect();
            let Some((leaf, parents)) = segments.split_last() else {
                warn!(file = %file.name, "skipping file with an empty name");
                continue;
            };

            let mut cursor = Some(&mut root);
            for segment in parents {
                cursor = cursor.and_then(|directory| directory.child_directory(segment));
            }

            let attached = cursor.is_some_and(|directory| {
                directory.attach_file(FileNode {
                    name: (*leaf).to_string(),
                    id,
                    file: file.clone(),
                })
            });
            if !attached {
                warn!(
                    file = %file.name,
                    "skipping file whose path collides with another entry"
                );
            }
        }

        root.aggregate();
        Self { root }
    }

    /// Root directory.
    #[must_use]
    pub const fn root(&self) -> &DirectoryNode {
        &self.root
    }

    /// Look up a node by file name or directory path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ContentsNode> {
        let segments: Vec<&str> = split_path(path).collect();
        self.root.find(&segments)
    }

    /// Nodes in display order paired with their depth (top level is `0`).
    #[must_use]
    pub fn iter_depth_first(&self) -> Vec<(usize, &ContentsNode)> {
        let mut out = Vec::new();
        self.root.collect(0, &mut out);
        out
    }

    /// Number of files in the tree.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.root.file_count()
    }
}
