//! Tree actions handed to the tree-maintenance consumer.
//!
//! Every action addresses nodes through [`NodeLocator`]s decoded from the
//! naming convention in [`crate::codec`], never through raw paths.

use crate::accumulator::BulkVaultEvent;
use crate::codec::{decode_scroll_basename, decode_section_basename_in};
use crate::events::VaultEvent;
use crate::intent::{classify, RenameIntent};
use crate::scope::{LibraryScope, Scope, ScopedEvent};
use crate::split_path::{SplitPath, SplitPathKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

/// Kind of node in the library tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNodeKind {
    /// A folder.
    Section,
    /// A markdown note.
    Scroll,
    /// Any other file.
    File,
}

impl TreeNodeKind {
    /// Node kind for a path kind.
    pub fn of(kind: &SplitPathKind) -> Self {
        match kind {
            SplitPathKind::Folder => Self::Section,
            SplitPathKind::MdFile => Self::Scroll,
            SplitPathKind::File { .. } => Self::File,
        }
    }

    /// Short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Scroll => "scroll",
            Self::File => "file",
        }
    }
}

/// Address of a node in the library tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLocator {
    /// Section names from the library root down to the parent.
    pub parent_chain: Vec<String>,
    /// Decoded node name.
    pub name: String,
    /// Section, scroll or file.
    pub kind: TreeNodeKind,
    /// Extension for non-markdown files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl NodeLocator {
    /// Locate the node a library-relative path physically is.
    ///
    /// The parent chain comes from the folders the path sits in; the name is
    /// decoded from the basename.
    pub fn locate(path: &SplitPath) -> Self {
        let name = match path.kind {
            SplitPathKind::Folder => {
                decode_section_basename_in(&path.basename, &path.segments).name
            }
            SplitPathKind::MdFile | SplitPathKind::File { .. } => {
                decode_scroll_basename(&path.basename).core_name
            }
        };
        Self::build(path, path.segments.clone(), name)
    }

    /// Decode where the path's basename says the node belongs.
    ///
    /// A basename that spells a chain belongs under that chain, counted from
    /// the library root; one that spells none stays where it is.
    pub fn decode(path: &SplitPath) -> Self {
        match path.kind {
            SplitPathKind::Folder => {
                let decoded = decode_section_basename_in(&path.basename, &path.segments);
                let parent_chain = if decoded.inline_chain.is_empty() {
                    path.segments.clone()
                } else {
                    decoded.inline_chain
                };
                Self::build(path, parent_chain, decoded.name)
            }
            SplitPathKind::MdFile | SplitPathKind::File { .. } => {
                let decoded = decode_scroll_basename(&path.basename);
                let parent_chain = if decoded.suffix.is_empty() {
                    path.segments.clone()
                } else {
                    decoded.chain()
                };
                Self::build(path, parent_chain, decoded.core_name)
            }
        }
    }

    fn build(path: &SplitPath, parent_chain: Vec<String>, name: String) -> Self {
        let extension = match &path.kind {
            SplitPathKind::File { extension } => extension.clone(),
            SplitPathKind::Folder | SplitPathKind::MdFile => None,
        };
        Self {
            parent_chain,
            name,
            kind: TreeNodeKind::of(&path.kind),
            extension,
        }
    }

    /// Locator of the section this node sits in.
    pub fn parent(&self) -> SectionLocator {
        SectionLocator::new(self.parent_chain.clone())
    }
}

impl fmt::Display for NodeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.parent_chain {
            write!(f, "{}/", section)?;
        }
        write!(f, "{} ({})", self.name, self.kind.as_str())
    }
}

/// Address of a section; the empty chain is the library root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SectionLocator {
    /// Section names from the library root down to this section.
    pub chain: Vec<String>,
}

impl SectionLocator {
    /// Section at `chain`.
    pub fn new(chain: Vec<String>) -> Self {
        Self { chain }
    }

    /// Whether this is the library root.
    pub fn is_root(&self) -> bool {
        self.chain.is_empty()
    }
}

/// A semantic change to the library tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeAction {
    /// Add a node.
    Create {
        /// Node to add.
        target: NodeLocator,
    },
    /// Remove a node and its subtree.
    Delete {
        /// Node to remove.
        target: NodeLocator,
    },
    /// Rename a node in place.
    Rename {
        /// Node to rename.
        target: NodeLocator,
        /// Its new name.
        new_node_name: String,
    },
    /// Re-parent a node, possibly renaming it.
    Move {
        /// Node to move.
        target: NodeLocator,
        /// Section it moves into.
        new_parent: SectionLocator,
        /// Its name after the move.
        new_node_name: String,
    },
}

impl TreeAction {
    /// Node the action applies to.
    pub fn target(&self) -> &NodeLocator {
        match self {
            Self::Create { target }
            | Self::Delete { target }
            | Self::Rename { target, .. }
            | Self::Move { target, .. } => target,
        }
    }

    /// Short name of the variant, for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Delete { .. } => "delete",
            Self::Rename { .. } => "rename",
            Self::Move { .. } => "move",
        }
    }
}

/// Build the action for one scoped root.
///
/// Returns `None` for events that do not touch the library.
pub fn build_tree_action(scoped: &ScopedEvent) -> Option<TreeAction> {
    let ScopedEvent { event, scope } = scoped;
    match (event, scope) {
        (_, Scope::OutsideToOutside) => None,

        (
            VaultEvent::FileCreated { split_path } | VaultEvent::FolderCreated { split_path },
            Scope::InsideToInside,
        ) => Some(TreeAction::Create {
            target: NodeLocator::locate(split_path),
        }),

        (
            VaultEvent::FileDeleted { split_path } | VaultEvent::FolderDeleted { split_path },
            Scope::InsideToInside,
        ) => Some(TreeAction::Delete {
            target: NodeLocator::locate(split_path),
        }),

        (
            VaultEvent::FileRenamed { to, .. } | VaultEvent::FolderRenamed { to, .. },
            Scope::OutsideToInside,
        ) => Some(TreeAction::Create {
            target: NodeLocator::locate(to),
        }),

        (
            VaultEvent::FileRenamed { from, .. } | VaultEvent::FolderRenamed { from, .. },
            Scope::InsideToOutside,
        ) => Some(TreeAction::Delete {
            target: NodeLocator::locate(from),
        }),

        (
            VaultEvent::FileRenamed { from, to } | VaultEvent::FolderRenamed { from, to },
            Scope::InsideToInside,
        ) => Some(build_rename_or_move(from, to)),

        (
            VaultEvent::FileCreated { .. }
            | VaultEvent::FileDeleted { .. }
            | VaultEvent::FolderCreated { .. }
            | VaultEvent::FolderDeleted { .. },
            Scope::InsideToOutside | Scope::OutsideToInside,
        ) => {
            warn!("Single-path event {} carries two-sided scope {:?}; skipping", event, scope);
            None
        }
    }
}

fn build_rename_or_move(from: &SplitPath, to: &SplitPath) -> TreeAction {
    let target = NodeLocator::locate(from);
    match classify(from, to) {
        RenameIntent::Rename => TreeAction::Rename {
            target,
            new_node_name: NodeLocator::decode(to).name,
        },
        RenameIntent::Move => {
            // Same basename: the folder it landed in is the truth.
            // Otherwise the new basename spells where it should go.
            let destination = if from.basename == to.basename {
                NodeLocator::locate(to)
            } else {
                NodeLocator::decode(to)
            };
            TreeAction::Move {
                target,
                new_parent: destination.parent(),
                new_node_name: destination.name,
            }
        }
    }
}

/// Build one action per root that touches the library, in root order.
pub fn build_tree_actions(roots: &[ScopedEvent]) -> Vec<TreeAction> {
    roots.iter().filter_map(build_tree_action).collect()
}

/// Turns a closed window into tree actions for a given library root.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeActionPlanner;

impl TreeActionPlanner {
    /// Scope the roots, drop those outside the library, and build actions.
    pub fn plan(bulk: &BulkVaultEvent, library_root: &SplitPath) -> Vec<TreeAction> {
        let scoped = Self::scope_roots(&bulk.roots, library_root);
        let actions = build_tree_actions(&scoped);
        debug!(
            window_id = %bulk.window_id,
            roots = bulk.roots.len(),
            in_library = scoped.len(),
            actions = actions.len(),
            "Planned tree actions"
        );
        actions
    }

    /// Scope `roots` against `library_root`, keeping only those touching the library.
    pub fn scope_roots(roots: &[VaultEvent], library_root: &SplitPath) -> Vec<ScopedEvent> {
        let library = LibraryScope::new(library_root);
        roots
            .iter()
            .map(|event| library.scope(event))
            .filter(|scoped| {
                let keep = scoped.scope.touches_library();
                if !keep {
                    trace!("Dropping out-of-library root {}", scoped.event);
                }
                keep
            })
            .collect()
    }
}
