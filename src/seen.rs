//! Persisted set of already-announced article identifiers.
//!
//! Stored as a JSON array ordered oldest to newest. The set is bounded:
//! once it holds `capacity` identifiers, each insert evicts the oldest.
//! Reads are permissive (a missing or corrupt file is an empty set) and
//! writes go through a temp file and rename, so the existing file is either
//! replaced whole or left as it was.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Insertion-ordered set of identifiers with a fixed capacity.
#[derive(Debug, Clone)]
pub struct SeenSet {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl SeenSet {
    /// An empty set. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from a stored array, keeping its order and the newest
    /// `capacity` entries.
    pub fn from_entries<I: IntoIterator<Item = String>>(entries: I, capacity: usize) -> Self {
        let mut set = Self::new(capacity);
        for id in entries {
            set.insert(&id);
        }
        set
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.members.contains(identifier)
    }

    /// Returns `false` when the identifier was already present.
    pub fn insert(&mut self, identifier: &str) -> bool {
        if self.members.contains(identifier) {
            return false;
        }
        self.order.push_back(identifier.to_string());
        self.members.insert(identifier.to_string());
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// JSON file backing a [`SeenSet`].
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    capacity: usize,
}

impl SeenStore {
    /// # Arguments
    ///
    /// * `path` - JSON file, created on first [`ensure`](Self::ensure)
    /// * `capacity` - Most identifiers kept when loading or saving
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create parent directories and an empty array if the file is absent.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn ensure(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        if fs::metadata(&self.path).await.is_err() {
            fs::write(&self.path, "[]").await?;
            info!("Created empty seen-set");
        }
        Ok(())
    }

    /// Load the set; any read or parse failure yields an empty set.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> SeenSet {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Seen-set unreadable; starting empty");
                return SeenSet::new(self.capacity);
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => {
                let set = SeenSet::from_entries(entries, self.capacity);
                debug!(count = set.len(), "Loaded seen-set");
                set
            }
            Err(e) => {
                warn!(error = %e, "Seen-set is not a JSON string array; starting empty");
                SeenSet::new(self.capacity)
            }
        }
    }

    /// Write the newest `capacity` identifiers, oldest first.
    ///
    /// The JSON is written to a sibling `.json.tmp` file and renamed over
    /// the target, so readers see either the old or the new array.
    ///
    /// # Errors
    ///
    /// Any I/O error from the write or the rename. The target file is
    /// unchanged in that case.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = set.len()))]
    pub async fn save(&self, set: &SeenSet) -> io::Result<()> {
        let skip = set.len().saturating_sub(self.capacity);
        let entries: Vec<&str> = set.iter().skip(skip).collect();
        let json = serde_json::to_string_pretty(&entries).map_err(io::Error::other)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        info!(count = entries.len(), "Saved seen-set");
        Ok(())
    }
}
