//! Root reduction for one bulk window.
//!
//! A folder rename or delete arrives together with one notification per
//! descendant. Reduction keeps only the events that are not implied by some
//! other rename or delete in the same window.

use crate::events::VaultEvent;
use crate::split_path::SplitPath;
use tracing::{debug, trace};

/// Compute the minimal set of root events for a window.
///
/// An event is kept iff no *other* rename or delete in `events` implies it.
/// The result is a value-subset of `events` in arrival order; nothing is
/// synthesized.
///
/// Exact duplicates of a rename or delete imply each other, so both copies
/// drop out. Duplicate suppression belongs upstream of this stage.
pub fn reduce_roots(events: &[VaultEvent]) -> Vec<VaultEvent> {
    let possible_roots: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.can_imply())
        .map(|(index, _)| index)
        .collect();

    let roots: Vec<VaultEvent> = events
        .iter()
        .enumerate()
        .filter(|(index, event)| {
            let implied_by = possible_roots
                .iter()
                .copied()
                .find(|&root| root != *index && implies(&events[root], event));
            if let Some(root) = implied_by {
                trace!("{} is implied by {}", event, events[root]);
            }
            implied_by.is_none()
        })
        .map(|(_, event)| event.clone())
        .collect();

    debug!(
        events = events.len(),
        possible_roots = possible_roots.len(),
        roots = roots.len(),
        "Reduced window"
    );
    roots
}

/// Whether `root` fully explains `event`.
///
/// - Any rename or delete implies an exact duplicate of itself.
/// - `FolderDeleted(A)` implies every event whose path (or rename source)
///   lies under `A`.
/// - `FolderRenamed(A -> B)` implies a rename whose source lies under `A`
///   and whose destination is the same relative position under `B`, with the
///   same basename and kind.
pub fn implies(root: &VaultEvent, event: &VaultEvent) -> bool {
    if !root.can_imply() {
        return false;
    }
    if root == event {
        return true;
    }

    match root {
        VaultEvent::FolderDeleted { split_path } => {
            event.primary_path().is_under(&split_path.chain())
        }
        VaultEvent::FolderRenamed { from, to } => follows_folder_rename(from, to, event),
        VaultEvent::FileDeleted { .. }
        | VaultEvent::FileRenamed { .. }
        | VaultEvent::FileCreated { .. }
        | VaultEvent::FolderCreated { .. } => false,
    }
}

fn follows_folder_rename(old_folder: &SplitPath, new_folder: &SplitPath, event: &VaultEvent) -> bool {
    let (from, to) = match event {
        VaultEvent::FileRenamed { from, to } | VaultEvent::FolderRenamed { from, to } => (from, to),
        VaultEvent::FileCreated { .. }
        | VaultEvent::FileDeleted { .. }
        | VaultEvent::FolderCreated { .. }
        | VaultEvent::FolderDeleted { .. } => return false,
    };

    let old_prefix = old_folder.chain();
    let new_prefix = new_folder.chain();
    if !from.is_under(&old_prefix) || !to.is_under(&new_prefix) {
        return false;
    }

    from.segments[old_prefix.len()..] == to.segments[new_prefix.len()..]
        && from.basename == to.basename
        && from.kind == to.kind
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(path: &str) -> SplitPath {
        SplitPath::parse(path, true).unwrap()
    }

    fn file(path: &str) -> SplitPath {
        SplitPath::parse(path, false).unwrap()
    }

    fn folder_renamed(from: &str, to: &str) -> VaultEvent {
        VaultEvent::renamed(folder(from), folder(to)).unwrap()
    }

    fn file_renamed(from: &str, to: &str) -> VaultEvent {
        VaultEvent::renamed(file(from), file(to)).unwrap()
    }

    #[test]
    fn folder_rename_absorbs_consistent_descendants() {
        let root = folder_renamed("A", "B");
        let events = vec![
            root.clone(),
            file_renamed("A/x.md", "B/x.md"),
            file_renamed("A/sub/c.md", "B/sub/c.md"),
        ];
        assert_eq!(reduce_roots(&events), vec![root]);
    }

    #[test]
    fn descendants_arriving_first_are_still_absorbed() {
        let root = folder_renamed("A", "B");
        let events = vec![
            file_renamed("A/sub/c.md", "B/sub/c.md"),
            folder_renamed("A/sub", "B/sub"),
            root.clone(),
        ];
        assert_eq!(reduce_roots(&events), vec![root]);
    }

    #[test]
    fn destination_outside_renamed_folder_stays_root() {
        let events = vec![folder_renamed("A", "B"), file_renamed("A/x.md", "C/x.md")];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn extension_change_inside_renamed_folder_stays_root() {
        let events = vec![folder_renamed("A", "B"), file_renamed("A/x.md", "B/x.txt")];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn extra_rename_of_descendant_stays_root() {
        let events = vec![folder_renamed("A", "B"), file_renamed("A/x.md", "B/y.md")];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn relative_position_change_stays_root() {
        let events = vec![folder_renamed("A", "B"), file_renamed("A/x.md", "B/sub/x.md")];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn folder_delete_absorbs_everything_below() {
        let root = VaultEvent::deleted(folder("Library/A"));
        let events = vec![
            VaultEvent::deleted(file("Library/A/x.md")),
            VaultEvent::deleted(folder("Library/A/sub")),
            VaultEvent::created(file("Library/A/sub/new.md")),
            file_renamed("Library/A/y.md", "Library/z.md"),
            root.clone(),
        ];
        assert_eq!(reduce_roots(&events), vec![root]);
    }

    #[test]
    fn folder_delete_leaves_siblings_alone() {
        let events = vec![
            VaultEvent::deleted(folder("Library/A")),
            VaultEvent::deleted(file("Library/AB/x.md")),
            VaultEvent::deleted(file("Library/x.md")),
        ];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn creates_never_imply_anything() {
        let events = vec![
            VaultEvent::created(folder("Library/A")),
            VaultEvent::created(file("Library/A/x.md")),
        ];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn duplicate_creates_are_both_kept() {
        let created = VaultEvent::created(file("Library/x.md"));
        let events = vec![created.clone(), created];
        assert_eq!(reduce_roots(&events), events);
    }

    #[test]
    fn exact_duplicate_renames_cancel_out() {
        let rename = file_renamed("Library/x.md", "Library/y.md");
        assert!(reduce_roots(&[rename.clone(), rename]).is_empty());
    }

    #[test]
    fn exact_duplicate_folder_deletes_take_descendants_with_them() {
        let delete = VaultEvent::deleted(folder("Library/A"));
        let events = vec![
            delete.clone(),
            VaultEvent::deleted(file("Library/A/x.md")),
            delete,
        ];
        assert!(reduce_roots(&events).is_empty());
    }

    #[test]
    fn file_events_imply_only_duplicates() {
        let delete = VaultEvent::deleted(file("Library/x.md"));
        let other = VaultEvent::deleted(file("Library/y.md"));
        assert!(implies(&delete, &delete.clone()));
        assert!(!implies(&delete, &other));
        assert!(!implies(&VaultEvent::created(file("Library/x.md")), &delete));
    }

    #[test]
    fn reduction_of_reduction_is_stable() {
        let events = vec![
            folder_renamed("A", "B"),
            file_renamed("A/x.md", "B/x.md"),
            file_renamed("A/y.md", "C/y.md"),
            VaultEvent::created(file("D/new.md")),
            VaultEvent::deleted(folder("E")),
            VaultEvent::deleted(file("E/old.md")),
        ];
        let once = reduce_roots(&events);
        assert_eq!(once.len(), 4);
        assert_eq!(reduce_roots(&once), once);
    }
}
