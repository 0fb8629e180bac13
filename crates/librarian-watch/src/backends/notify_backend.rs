//! Notify-based event source for vaults living on a local file system.

use crate::{
    error::{Error, Result},
    events::{RawChange, RawEntry},
    traits::{RawChangeListener, SourceSubscription, VaultEventSource},
};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, trace};
use walkdir::WalkDir;

/// How long the debouncer waits for the second half of a rename.
///
/// A `From` half still unmatched after this long is reported on its own and
/// means the entry left the watched tree.
pub const RENAME_PAIRING_TIMEOUT: Duration = Duration::from_millis(100);

/// Turns debounced notify events into host-shaped [`RawChange`]s.
///
/// Rename halves arrive already stitched into one paired event by the
/// debouncer. Once a path is gone it can no longer be asked whether it was a
/// folder, so the translator keeps the set of folders it has seen.
#[derive(Debug)]
pub struct NotifyTranslator {
    vault_root: PathBuf,
    known_folders: HashSet<PathBuf>,
}

impl NotifyTranslator {
    /// Translator for paths under `vault_root`.
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            known_folders: HashSet::new(),
        }
    }

    /// Root all reported paths are made relative to.
    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    /// Record every folder currently under the vault root.
    pub fn scan(&mut self) -> usize {
        let root = self.vault_root.clone();
        let found = self.scan_under(&root);
        debug!("Found {} folders under {}", found, root.display());
        found
    }

    /// Whether `path` is a folder the translator knows about.
    pub fn is_known_folder(&self, path: &Path) -> bool {
        self.known_folders.contains(path)
    }

    /// Translate one debounced notify event.
    pub fn translate(&mut self, event: &Event) -> Vec<RawChange> {
        let mut changes = Vec::new();

        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let [from, to, ..] = event.paths.as_slice() {
                    changes.extend(self.rename(from, to));
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                // No destination arrived in time: the entry left the vault.
                for path in &event.paths {
                    let is_folder = self.forget(path);
                    changes.extend(self.deleted(path, is_folder));
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                for path in &event.paths {
                    changes.extend(self.appeared(path, path.is_dir()));
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => {
                // Unpaired rename half: the path either appeared or vanished.
                for path in &event.paths {
                    if path.exists() {
                        changes.extend(self.appeared(path, path.is_dir()));
                    } else {
                        let is_folder = self.forget(path);
                        changes.extend(self.deleted(path, is_folder));
                    }
                }
            }
            EventKind::Create(kind) => {
                for path in &event.paths {
                    let is_folder = match kind {
                        CreateKind::Folder => true,
                        CreateKind::File => false,
                        _ => path.is_dir(),
                    };
                    changes.extend(self.appeared(path, is_folder));
                }
            }
            EventKind::Remove(kind) => {
                for path in &event.paths {
                    let known = self.forget(path);
                    let is_folder = known || matches!(kind, RemoveKind::Folder);
                    changes.extend(self.deleted(path, is_folder));
                }
            }
            _ => {}
        }

        changes
    }

    fn rename(&mut self, from: &Path, to: &Path) -> Option<RawChange> {
        let is_folder = to.is_dir() || self.is_known_folder(from);
        match (self.relative(from), self.relative(to)) {
            (Some(from_path), Some(to_path)) => {
                if is_folder {
                    self.rekey(from, to);
                }
                Some(RawChange::Renamed {
                    from: RawEntry {
                        path: from_path,
                        is_folder,
                    },
                    to: RawEntry {
                        path: to_path,
                        is_folder,
                    },
                })
            }
            (None, Some(_)) => self.appeared(to, is_folder),
            (Some(from_path), None) => {
                self.forget(from);
                Some(RawChange::Deleted(RawEntry {
                    path: from_path,
                    is_folder,
                }))
            }
            (None, None) => None,
        }
    }

    fn appeared(&mut self, path: &Path, is_folder: bool) -> Option<RawChange> {
        let relative = self.relative(path)?;
        if is_folder {
            self.scan_under(path);
        }
        Some(RawChange::Created(RawEntry {
            path: relative,
            is_folder,
        }))
    }

    fn deleted(&self, path: &Path, is_folder: bool) -> Option<RawChange> {
        let path = self.relative(path)?;
        Some(RawChange::Deleted(RawEntry { path, is_folder }))
    }

    /// Record `path` and every folder below it; returns how many were added.
    fn scan_under(&mut self, path: &Path) -> usize {
        let mut added = 0;
        for entry in WalkDir::new(path).into_iter().filter_map(|entry| entry.ok()) {
            if entry.file_type().is_dir()
                && entry.path() != self.vault_root
                && self.known_folders.insert(entry.into_path())
            {
                added += 1;
            }
        }
        added
    }

    /// Forget `path` and everything under it; whether it was a known folder.
    fn forget(&mut self, path: &Path) -> bool {
        let was_folder = self.known_folders.remove(path);
        self.known_folders.retain(|known| !known.starts_with(path));
        was_folder
    }

    /// Move known folders at and below `from` to the same place under `to`.
    fn rekey(&mut self, from: &Path, to: &Path) {
        let moved: Vec<PathBuf> = self
            .known_folders
            .iter()
            .filter(|known| known.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            self.known_folders.remove(&old);
            if let Ok(rest) = old.strip_prefix(from) {
                let new = if rest.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rest)
                };
                self.known_folders.insert(new);
            }
        }
        self.known_folders.insert(to.to_path_buf());
    }

    /// Vault-relative `/`-joined form of `path`, or `None` outside the vault.
    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.vault_root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            trace!("Ignoring event for the vault root itself");
            return None;
        }
        Some(parts.join("/"))
    }
}

/// Watches a vault directory recursively with the platform's native watcher.
#[derive(Debug, Clone)]
pub struct NotifyEventSource {
    vault_root: PathBuf,
    pairing_timeout: Duration,
}

impl NotifyEventSource {
    /// Source for the vault at `vault_root`.
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            pairing_timeout: RENAME_PAIRING_TIMEOUT,
        }
    }

    /// Use a different rename pairing timeout.
    pub fn with_pairing_timeout(mut self, timeout: Duration) -> Self {
        self.pairing_timeout = timeout;
        self
    }

    /// Directory being watched.
    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }
}

impl VaultEventSource for NotifyEventSource {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn subscribe(&self, listener: RawChangeListener) -> Result<SourceSubscription> {
        let root = self.vault_root.canonicalize()?;
        let mut translator = NotifyTranslator::new(root.clone());
        translator.scan();

        let mut debouncer = new_debouncer(
            self.pairing_timeout,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    for event in events {
                        for change in translator.translate(&event.event) {
                            listener(change);
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Notify error: {:?}", e);
                    }
                }
            },
        )
        .map_err(|e| Error::Watch(format!("Failed to create notify watcher: {}", e)))?;

        debouncer
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::Watch(format!("Failed to watch {}: {}", root.display(), e)))?;

        info!("Watching vault at {}", root.display());
        Ok(SourceSubscription::new(move || {
            debug!("Stopped watching vault at {}", root.display());
            drop(debouncer);
        }))
    }
}
