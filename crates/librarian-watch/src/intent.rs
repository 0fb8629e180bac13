//! Rename vs move classification for in-library renames.

use crate::codec::{decode_scroll_basename, decode_section_basename_in, expected_suffix};
use crate::events::VaultEvent;
use crate::split_path::SplitPath;
use serde::{Deserialize, Serialize};

/// What a rename-shaped change means for the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameIntent {
    /// Same logical position, new name.
    Rename,
    /// New logical position.
    Move,
}

/// Classify a library-relative rename from `from` to `to`.
///
/// Identical basenames mean only the location changed. Otherwise the change
/// is a rename iff the node stayed in its folder and the chain its new
/// basename encodes still matches that folder. A section whose basename
/// spells no chain stays where it is. Anything that cannot be decoded is a
/// move.
///
/// A change of folder is always a move, even when the new basename already
/// spells the new folder's chain.
pub fn classify(from: &SplitPath, to: &SplitPath) -> RenameIntent {
    if from.basename == to.basename || from.segments != to.segments {
        return RenameIntent::Move;
    }

    let position_unchanged = if to.is_folder() {
        let decoded = decode_section_basename_in(&to.basename, &to.segments);
        decoded.is_well_formed()
            && (decoded.inline_chain.is_empty() || decoded.inline_chain == to.segments)
    } else {
        let decoded = decode_scroll_basename(&to.basename);
        decoded.is_well_formed() && decoded.suffix == expected_suffix(&to.segments)
    };

    if position_unchanged {
        RenameIntent::Rename
    } else {
        RenameIntent::Move
    }
}

/// Classify a rename event; `None` for creates and deletes.
pub fn classify_event(event: &VaultEvent) -> Option<RenameIntent> {
    match event {
        VaultEvent::FileRenamed { from, to } | VaultEvent::FolderRenamed { from, to } => {
            Some(classify(from, to))
        }
        VaultEvent::FileCreated { .. }
        | VaultEvent::FileDeleted { .. }
        | VaultEvent::FolderCreated { .. }
        | VaultEvent::FolderDeleted { .. } => None,
    }
}
