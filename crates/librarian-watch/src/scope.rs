//! Translation between vault-absolute and library-relative addressing.

use crate::events::VaultEvent;
use crate::split_path::SplitPath;
use serde::{Deserialize, Serialize};

/// Where each side of an event lies relative to the library root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Both sides inside the library (single-path events inside too).
    InsideToInside,
    /// A rename leaving the library.
    InsideToOutside,
    /// A rename entering the library.
    OutsideToInside,
    /// Nothing to do with the library.
    OutsideToOutside,
}

impl Scope {
    /// Combine the two sides of an event.
    pub fn from_sides(from_inside: bool, to_inside: bool) -> Self {
        match (from_inside, to_inside) {
            (true, true) => Self::InsideToInside,
            (true, false) => Self::InsideToOutside,
            (false, true) => Self::OutsideToInside,
            (false, false) => Self::OutsideToOutside,
        }
    }

    /// Whether the source (or only) side is inside.
    pub fn from_inside(self) -> bool {
        matches!(self, Self::InsideToInside | Self::InsideToOutside)
    }

    /// Whether the destination side is inside.
    pub fn to_inside(self) -> bool {
        matches!(self, Self::InsideToInside | Self::OutsideToInside)
    }

    /// Whether the event touches the library at all.
    pub fn touches_library(self) -> bool {
        !matches!(self, Self::OutsideToOutside)
    }
}

/// An event with its in-library sides rewritten to library-relative paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedEvent {
    /// The rewritten event.
    pub event: VaultEvent,
    /// Which sides were rewritten.
    pub scope: Scope,
}

/// Scope translator for one library root.
///
/// Holds only the root's folder chain; build a fresh one whenever the root
/// may have changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryScope {
    root_chain: Vec<String>,
}

impl LibraryScope {
    /// Translator for the library rooted at `library_root`.
    pub fn new(library_root: &SplitPath) -> Self {
        Self {
            root_chain: library_root.chain(),
        }
    }

    /// Folder names from the vault root down to the library root.
    pub fn root_chain(&self) -> &[String] {
        &self.root_chain
    }

    /// Whether `path` lies below the library root.
    ///
    /// A path with fewer segments than the root chain is never inside.
    pub fn contains(&self, path: &SplitPath) -> bool {
        path.is_under(&self.root_chain)
    }

    fn strip(&self, path: &SplitPath) -> (SplitPath, bool) {
        if self.contains(path) {
            (path.strip_leading(self.root_chain.len()), true)
        } else {
            (path.clone(), false)
        }
    }

    fn restore(&self, path: &SplitPath, inside: bool) -> SplitPath {
        if inside {
            path.with_prefix(&self.root_chain)
        } else {
            path.clone()
        }
    }

    /// Tag an event with its scope and strip the root from inside sides.
    pub fn scope(&self, event: &VaultEvent) -> ScopedEvent {
        match event {
            VaultEvent::FileCreated { split_path }
            | VaultEvent::FileDeleted { split_path }
            | VaultEvent::FolderCreated { split_path }
            | VaultEvent::FolderDeleted { split_path } => {
                let (split_path, inside) = self.strip(split_path);
                ScopedEvent {
                    event: with_single_path(event, split_path),
                    scope: Scope::from_sides(inside, inside),
                }
            }
            VaultEvent::FileRenamed { from, to } | VaultEvent::FolderRenamed { from, to } => {
                let (from, from_inside) = self.strip(from);
                let (to, to_inside) = self.strip(to);
                ScopedEvent {
                    event: with_both_paths(event, from, to),
                    scope: Scope::from_sides(from_inside, to_inside),
                }
            }
        }
    }

    /// Exact inverse of [`LibraryScope::scope`].
    pub fn unscope(&self, scoped: &ScopedEvent) -> VaultEvent {
        let ScopedEvent { event, scope } = scoped;
        match event {
            VaultEvent::FileCreated { split_path }
            | VaultEvent::FileDeleted { split_path }
            | VaultEvent::FolderCreated { split_path }
            | VaultEvent::FolderDeleted { split_path } => {
                with_single_path(event, self.restore(split_path, scope.from_inside()))
            }
            VaultEvent::FileRenamed { from, to } | VaultEvent::FolderRenamed { from, to } => {
                with_both_paths(
                    event,
                    self.restore(from, scope.from_inside()),
                    self.restore(to, scope.to_inside()),
                )
            }
        }
    }
}

/// Scope `event` against `library_root`.
pub fn scope(event: &VaultEvent, library_root: &SplitPath) -> ScopedEvent {
    LibraryScope::new(library_root).scope(event)
}

/// Undo [`scope`] for the same `library_root`.
pub fn unscope(scoped: &ScopedEvent, library_root: &SplitPath) -> VaultEvent {
    LibraryScope::new(library_root).unscope(scoped)
}

fn with_single_path(event: &VaultEvent, split_path: SplitPath) -> VaultEvent {
    match event {
        VaultEvent::FileCreated { .. } => VaultEvent::FileCreated { split_path },
        VaultEvent::FileDeleted { .. } => VaultEvent::FileDeleted { split_path },
        VaultEvent::FolderCreated { .. } => VaultEvent::FolderCreated { split_path },
        VaultEvent::FolderDeleted { .. } => VaultEvent::FolderDeleted { split_path },
        VaultEvent::FileRenamed { .. } | VaultEvent::FolderRenamed { .. } => event.clone(),
    }
}

fn with_both_paths(event: &VaultEvent, from: SplitPath, to: SplitPath) -> VaultEvent {
    match event {
        VaultEvent::FileRenamed { .. } => VaultEvent::FileRenamed { from, to },
        VaultEvent::FolderRenamed { .. } => VaultEvent::FolderRenamed { from, to },
        VaultEvent::FileCreated { .. }
        | VaultEvent::FileDeleted { .. }
        | VaultEvent::FolderCreated { .. }
        | VaultEvent::FolderDeleted { .. } => event.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> SplitPath {
        SplitPath::parse("Library", true).unwrap()
    }

    fn file(path: &str) -> SplitPath {
        SplitPath::parse(path, false).unwrap()
    }

    fn folder(path: &str) -> SplitPath {
        SplitPath::parse(path, true).unwrap()
    }

    #[test]
    fn created_inside_library_is_stripped() {
        let event = VaultEvent::created(file("Library/Section/Note-Section.md"));
        let scoped = scope(&event, &library());
        assert_eq!(scoped.scope, Scope::InsideToInside);
        assert_eq!(scoped.event.primary_path().segments, vec!["Section"]);
        assert_eq!(scoped.event.primary_path().basename, "Note-Section");
    }

    #[test]
    fn created_outside_library_is_untouched() {
        let event = VaultEvent::created(file("Other/Section/Note.md"));
        let scoped = scope(&event, &library());
        assert_eq!(scoped.scope, Scope::OutsideToOutside);
        assert_eq!(scoped.event, event);
    }

    #[test]
    fn rename_sides_are_classified_independently() {
        let root = library();
        let cases = [
            ("Library/a.md", "Library/b.md", Scope::InsideToInside),
            ("Library/a.md", "Other/a.md", Scope::InsideToOutside),
            ("Other/a.md", "Library/a.md", Scope::OutsideToInside),
            ("Other/a.md", "Else/a.md", Scope::OutsideToOutside),
        ];
        for (from, to, expected) in cases {
            let event = VaultEvent::renamed(file(from), file(to)).unwrap();
            let scoped = scope(&event, &root);
            assert_eq!(scoped.scope, expected, "{from} -> {to}");
        }
    }

    #[test]
    fn only_inside_side_is_rewritten() {
        let event = VaultEvent::renamed(file("Library/S/a.md"), file("Other/a.md")).unwrap();
        let scoped = scope(&event, &library());
        assert_eq!(scoped.event.primary_path().segments, vec!["S"]);
        assert_eq!(
            scoped.event.destination().unwrap().segments,
            vec!["Other"]
        );
    }

    #[test]
    fn library_root_itself_is_outside() {
        let event = VaultEvent::deleted(folder("Library"));
        assert_eq!(scope(&event, &library()).scope, Scope::OutsideToOutside);

        let shallow = VaultEvent::created(file("top.md"));
        assert_eq!(scope(&shallow, &library()).scope, Scope::OutsideToOutside);
    }

    #[test]
    fn nested_library_root() {
        let root = folder("Vault/Library");
        let event = VaultEvent::created(file("Vault/Library/S/n.md"));
        let scoped = scope(&event, &root);
        assert_eq!(scoped.scope, Scope::InsideToInside);
        assert_eq!(scoped.event.primary_path().segments, vec!["S"]);

        let sibling = VaultEvent::created(file("Vault/Other/n.md"));
        assert_eq!(scope(&sibling, &root).scope, Scope::OutsideToOutside);
    }

    #[test]
    fn unscope_restores_every_scope() {
        let root = library();
        let events = [
            VaultEvent::created(file("Library/S/n.md")),
            VaultEvent::deleted(folder("Other/S")),
            VaultEvent::renamed(file("Library/a.md"), file("Other/a.md")).unwrap(),
            VaultEvent::renamed(folder("Other/a"), folder("Library/S/a")).unwrap(),
            VaultEvent::renamed(folder("Library/a"), folder("Library/b")).unwrap(),
        ];
        for event in events {
            assert_eq!(unscope(&scope(&event, &root), &root), event);
        }
    }
}
