//! Vault event types and the normalizer that produces them.

use crate::error::{Error, Result};
use crate::split_path::SplitPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized vault change.
///
/// Created once by [`normalize`] and never mutated; later stages only wrap or
/// rewrite it into new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    /// A file appeared.
    FileCreated {
        /// Path of the new file.
        split_path: SplitPath,
    },
    /// A file disappeared.
    FileDeleted {
        /// Path of the removed file.
        split_path: SplitPath,
    },
    /// A file was renamed or moved.
    FileRenamed {
        /// Old path.
        from: SplitPath,
        /// New path.
        to: SplitPath,
    },
    /// A folder appeared.
    FolderCreated {
        /// Path of the new folder.
        split_path: SplitPath,
    },
    /// A folder disappeared.
    FolderDeleted {
        /// Path of the removed folder.
        split_path: SplitPath,
    },
    /// A folder was renamed or moved.
    FolderRenamed {
        /// Old path.
        from: SplitPath,
        /// New path.
        to: SplitPath,
    },
}

impl VaultEvent {
    /// Creation event matching the path's kind.
    pub fn created(split_path: SplitPath) -> Self {
        if split_path.is_folder() {
            Self::FolderCreated { split_path }
        } else {
            Self::FileCreated { split_path }
        }
    }

    /// Deletion event matching the path's kind.
    pub fn deleted(split_path: SplitPath) -> Self {
        if split_path.is_folder() {
            Self::FolderDeleted { split_path }
        } else {
            Self::FileDeleted { split_path }
        }
    }

    /// Rename event matching the paths' kind.
    ///
    /// Fails when one side is a folder and the other a file.
    pub fn renamed(from: SplitPath, to: SplitPath) -> Result<Self> {
        if !from.same_category(&to) {
            return Err(Error::MalformedRename {
                from: from.to_path_string(),
                to: to.to_path_string(),
            });
        }
        if from.is_folder() {
            Ok(Self::FolderRenamed { from, to })
        } else {
            Ok(Self::FileRenamed { from, to })
        }
    }

    /// Short name of the variant, for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileCreated { .. } => "file_created",
            Self::FileDeleted { .. } => "file_deleted",
            Self::FileRenamed { .. } => "file_renamed",
            Self::FolderCreated { .. } => "folder_created",
            Self::FolderDeleted { .. } => "folder_deleted",
            Self::FolderRenamed { .. } => "folder_renamed",
        }
    }

    /// Whether this is a rename of either kind.
    pub fn is_rename(&self) -> bool {
        matches!(self, Self::FileRenamed { .. } | Self::FolderRenamed { .. })
    }

    /// Whether this is a deletion of either kind.
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::FileDeleted { .. } | Self::FolderDeleted { .. })
    }

    /// Whether this is a creation of either kind.
    pub fn is_create(&self) -> bool {
        matches!(self, Self::FileCreated { .. } | Self::FolderCreated { .. })
    }

    /// Whether the event concerns a folder.
    pub fn is_folder_event(&self) -> bool {
        matches!(
            self,
            Self::FolderCreated { .. } | Self::FolderDeleted { .. } | Self::FolderRenamed { .. }
        )
    }

    /// Renames and deletes may subsume other events; creates never do.
    pub fn can_imply(&self) -> bool {
        self.is_rename() || self.is_delete()
    }

    /// The event's own path, or the source path for renames.
    pub fn primary_path(&self) -> &SplitPath {
        match self {
            Self::FileCreated { split_path }
            | Self::FileDeleted { split_path }
            | Self::FolderCreated { split_path }
            | Self::FolderDeleted { split_path } => split_path,
            Self::FileRenamed { from, .. } | Self::FolderRenamed { from, .. } => from,
        }
    }

    /// Destination path for renames.
    pub fn destination(&self) -> Option<&SplitPath> {
        match self {
            Self::FileRenamed { to, .. } | Self::FolderRenamed { to, .. } => Some(to),
            _ => None,
        }
    }
}

impl fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.destination() {
            Some(to) => write!(f, "{} {} -> {}", self.as_str(), self.primary_path(), to),
            None => write!(f, "{} {}", self.as_str(), self.primary_path()),
        }
    }
}

/// One side of a host change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Vault-relative path as the host reports it.
    pub path: String,
    /// Whether the host says this entry is a folder.
    pub is_folder: bool,
}

impl RawEntry {
    /// A file entry.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: false,
        }
    }

    /// A folder entry.
    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_folder: true,
        }
    }

    fn split(&self) -> Result<SplitPath> {
        SplitPath::parse(&self.path, self.is_folder)
    }
}

/// A host-native change notification, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawChange {
    /// `onCreate`
    Created(RawEntry),
    /// `onDelete`
    Deleted(RawEntry),
    /// `onRename`
    Renamed {
        /// Entry before the rename.
        from: RawEntry,
        /// Entry after the rename.
        to: RawEntry,
    },
}

/// Convert a host notification into a [`VaultEvent`].
pub fn normalize(raw: &RawChange) -> Result<VaultEvent> {
    match raw {
        RawChange::Created(entry) => Ok(VaultEvent::created(entry.split()?)),
        RawChange::Deleted(entry) => Ok(VaultEvent::deleted(entry.split()?)),
        RawChange::Renamed { from, to } => {
            if from.is_folder != to.is_folder {
                return Err(Error::MalformedRename {
                    from: from.path.clone(),
                    to: to.path.clone(),
                });
            }
            VaultEvent::renamed(from.split()?, to.split()?)
        }
    }
}
