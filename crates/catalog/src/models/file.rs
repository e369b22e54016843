use kbase_storage::FileInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

const ROOT_KEY: &str = "/";
const SEPARATOR: char = '/';

/// A node in a store's document tree.
///
/// Leaves are files; everything else is a directory whose `children` are its
/// immediate contents, in display order. Directory keys end with `/` so they
/// can never collide with a file of the same name.
///
/// The tree is only ever built from a storage listing (see
/// [`File::from_listing`]) and is persisted as part of its store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub key: String,
    pub title: String,
    pub size: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_time: OffsetDateTime,
    pub is_leaf: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<File>,
}

impl File {
    pub fn leaf(
        key: impl Into<String>,
        title: impl Into<String>,
        size: u64,
        created_time: OffsetDateTime,
        url: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            size,
            created_time,
            is_leaf: true,
            url,
            children: Vec::new(),
        }
    }

    pub fn directory(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            size: 0,
            created_time: OffsetDateTime::UNIX_EPOCH,
            is_leaf: false,
            url: None,
            children: Vec::new(),
        }
    }

    /// Index of the immediate children by key.
    ///
    /// Rebuilt from `children` on every call; hold on to the map rather than
    /// calling this in a loop.
    pub fn children_map(&self) -> HashMap<&str, &File> {
        self.children.iter().map(|child| (child.key.as_str(), child)).collect()
    }

    /// Find a node anywhere below (or at) this one by key.
    ///
    /// Only works from the root of a tree built by
    /// [`from_listing`](Self::from_listing), where every directory key is the
    /// path of that directory.
    pub fn find(&self, key: &str) -> Option<&File> {
        if self.key == key {
            return Some(self);
        }
        let mut current = self;
        let mut prefix = String::new();
        let mut segments = key.trim_end_matches(SEPARATOR).split(SEPARATOR).peekable();
        while let Some(segment) = segments.next() {
            prefix.push_str(segment);
            if segments.peek().is_some() || key.ends_with(SEPARATOR) {
                prefix.push(SEPARATOR);
            }
            current = current.children_map().get(prefix.as_str()).copied()?;
        }
        Some(current)
    }

    /// All files (leaves) in the tree, depth first in display order.
    pub fn leaves(&self) -> Vec<&File> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf {
                leaves.push(node);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Build a tree from a flat storage listing.
    ///
    /// Directories are synthesised from path components. A directory's size
    /// is the total of everything below it and its creation time is that of
    /// the newest file below it. Children are ordered directories first, then
    /// by key.
    pub fn from_listing<'a>(
        title: impl Into<String>,
        files: impl IntoIterator<Item = &'a FileInfo>,
        url: impl Fn(&FileInfo) -> Option<String>,
    ) -> Self {
        let mut root = File::directory(ROOT_KEY, title);
        for info in files {
            let key = info.key();
            let segments: Vec<&str> = key.split(SEPARATOR).collect();
            let Some((file_name, dirs)) = segments.split_last() else {
                continue;
            };
            let mut node = &mut root;
            let mut dir_key = String::new();
            for dir in dirs {
                dir_key.push_str(dir);
                dir_key.push(SEPARATOR);
                let position = match node.children.iter().position(|c| c.key == dir_key) {
                    Some(position) => position,
                    None => {
                        node.children.push(File::directory(dir_key.clone(), *dir));
                        node.children.len() - 1
                    },
                };
                node = &mut node.children[position];
            }
            node.children.push(File::leaf(key.as_str(), *file_name, info.size, info.modified, url(info)));
        }
        root.finalize();
        root
    }

    fn finalize(&mut self) {
        if self.is_leaf {
            return;
        }
        for child in &mut self.children {
            child.finalize();
        }
        self.children.sort_by(|a, b| a.is_leaf.cmp(&b.is_leaf).then_with(|| a.key.cmp(&b.key)));
        self.size = self.children.iter().map(|c| c.size).sum();
        self.created_time = self.children.iter().map(|c| c.created_time).max().unwrap_or(OffsetDateTime::UNIX_EPOCH);
    }
}
