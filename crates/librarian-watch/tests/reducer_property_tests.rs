//! Property-based tests for window reduction and library scoping
//!
//! Events are drawn from a small name space so that overlapping folder
//! renames, deletes and duplicates show up often.

use librarian_watch::{reduce_roots, scope, unscope, SplitPath, VaultEvent};
use proptest::prelude::*;

const NAMES: &[&str] = &["Library", "a", "b", "pie", "Note-a"];

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES).prop_map(str::to_string)
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(name(), 0..3)
}

fn split_path(is_folder: bool) -> impl Strategy<Value = SplitPath> {
    (segments(), name()).prop_map(move |(segments, basename)| {
        if is_folder {
            SplitPath::folder(segments, basename)
        } else {
            SplitPath::md_file(segments, basename)
        }
    })
}

fn event() -> impl Strategy<Value = VaultEvent> {
    any::<bool>().prop_flat_map(|is_folder| {
        prop_oneof![
            split_path(is_folder).prop_map(VaultEvent::created),
            split_path(is_folder).prop_map(VaultEvent::deleted),
            (split_path(is_folder), split_path(is_folder)).prop_map(|(from, to)| {
                VaultEvent::renamed(from, to).expect("same category")
            }),
        ]
    })
}

fn window() -> impl Strategy<Value = Vec<VaultEvent>> {
    prop::collection::vec(event(), 0..12)
}

proptest! {
    /// Property: roots are drawn from the window and never outnumber it
    #[test]
    fn roots_are_a_subset(events in window()) {
        let roots = reduce_roots(&events);
        prop_assert!(roots.len() <= events.len());
        for root in &roots {
            prop_assert!(events.contains(root));
        }
    }

    /// Property: reducing an already-reduced window changes nothing
    #[test]
    fn reduction_is_idempotent(events in window()) {
        let once = reduce_roots(&events);
        let twice = reduce_roots(&once);
        prop_assert_eq!(once, twice);
    }

    /// Property: unscope inverts scope for any event and library root
    #[test]
    fn scope_round_trips(event in event(), root in split_path(true)) {
        let scoped = scope(&event, &root);
        prop_assert_eq!(unscope(&scoped, &root), event);
    }

    /// Property: descendants that follow a folder rename collapse into it
    #[test]
    fn folder_rename_absorbs_consistent_descendants(
        tails in prop::collection::vec((segments(), name()), 1..6)
    ) {
        let old_folder = SplitPath::folder(vec!["Library".to_string()], "pie");
        let new_folder = SplitPath::folder(vec!["Library".to_string(), "a".to_string()], "pies");
        let root = VaultEvent::renamed(old_folder.clone(), new_folder.clone()).unwrap();

        let mut events = vec![root.clone()];
        for (tail, basename) in tails {
            let from = SplitPath::md_file([old_folder.chain(), tail.clone()].concat(), basename.clone());
            let to = SplitPath::md_file([new_folder.chain(), tail].concat(), basename);
            events.push(VaultEvent::renamed(from, to).unwrap());
        }

        prop_assert_eq!(reduce_roots(&events), vec![root]);
    }
}
