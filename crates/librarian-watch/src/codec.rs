//! Node naming convention.
//!
//! Scroll (note) basenames carry their ancestor chain as a dash-joined
//! suffix, nearest ancestor first: node `Note` under sections
//! `Test/parent/child` is stored as `Note-child-parent-Test`.
//!
//! Section (folder) basenames spell their chain root-first before the name:
//! section `child` under `Test/parent` is stored as `Test-parent-child`, and
//! renaming top-level section `pie` to `sweet-pie` asks for `pie` to live
//! under `sweet`. A nested section may also use the scroll spelling
//! (`child-parent-Test`); [`decode_section_basename_in`] picks whichever
//! reading matches the folder the section sits in.

/// Separator between the parts of an encoded basename.
pub const SUFFIX_DELIMITER: char = '-';

/// A decoded scroll basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollName {
    /// Name of the node itself.
    pub core_name: String,
    /// Ancestor names, nearest first.
    pub suffix: Vec<String>,
}

impl ScrollName {
    /// Ancestor chain root-first.
    pub fn chain(&self) -> Vec<String> {
        suffix_to_chain(&self.suffix)
    }

    /// Whether the basename has a usable core name.
    pub fn is_well_formed(&self) -> bool {
        !self.core_name.is_empty()
    }
}

/// A decoded section basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionName {
    /// Chain spelled in the basename, root-first.
    pub inline_chain: Vec<String>,
    /// Name of the section itself.
    pub name: String,
}

impl SectionName {
    /// Whether the basename has a usable name.
    pub fn is_well_formed(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Split a scroll basename into core name and suffix.
pub fn decode_scroll_basename(basename: &str) -> ScrollName {
    let mut parts = basename.split(SUFFIX_DELIMITER).map(str::to_string);
    let core_name = parts.next().unwrap_or_default();
    ScrollName {
        core_name,
        suffix: parts.collect(),
    }
}

/// Build a scroll basename for `core_name` under the root-first `chain`.
pub fn encode_scroll_basename(core_name: &str, chain: &[String]) -> String {
    let mut parts = vec![core_name.to_string()];
    parts.extend(expected_suffix(chain));
    parts.join(&SUFFIX_DELIMITER.to_string())
}

/// The suffix a scroll living under the root-first `chain` should carry.
pub fn expected_suffix(chain: &[String]) -> Vec<String> {
    chain.iter().rev().cloned().collect()
}

/// Turn a nearest-first suffix back into a root-first chain.
pub fn suffix_to_chain(suffix: &[String]) -> Vec<String> {
    suffix.iter().rev().cloned().collect()
}

/// Split a section basename into inline chain and name.
pub fn decode_section_basename(basename: &str) -> SectionName {
    let mut parts: Vec<String> = basename.split(SUFFIX_DELIMITER).map(str::to_string).collect();
    let name = parts.pop().unwrap_or_default();
    SectionName {
        inline_chain: parts,
        name,
    }
}

/// Decode a section basename against the root-first chain of its folder.
///
/// The root-first reading wins when it matches `folder_chain`, then the
/// nearest-first one. If neither matches, the basename is read root-first.
pub fn decode_section_basename_in(basename: &str, folder_chain: &[String]) -> SectionName {
    let root_first = decode_section_basename(basename);
    if root_first.inline_chain == folder_chain {
        return root_first;
    }

    let nearest_first = decode_scroll_basename(basename);
    if !nearest_first.suffix.is_empty() && nearest_first.chain() == folder_chain {
        return SectionName {
            inline_chain: nearest_first.chain(),
            name: nearest_first.core_name,
        };
    }
    root_first
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scroll_suffix_is_reversed_chain() {
        let decoded = decode_scroll_basename("Note-child-parent-Test");
        assert_eq!(decoded.core_name, "Note");
        assert_eq!(decoded.suffix, chain(&["child", "parent", "Test"]));
        assert_eq!(decoded.chain(), chain(&["Test", "parent", "child"]));
    }

    #[test]
    fn encode_matches_decode() {
        let encoded = encode_scroll_basename("Note", &chain(&["Test", "parent", "child"]));
        assert_eq!(encoded, "Note-child-parent-Test");
        assert_eq!(encode_scroll_basename("Note", &[]), "Note");
    }

    #[test]
    fn unsuffixed_scroll_has_empty_suffix() {
        let decoded = decode_scroll_basename("Note");
        assert_eq!(decoded.core_name, "Note");
        assert!(decoded.suffix.is_empty());
        assert!(decoded.is_well_formed());
        assert!(!decode_scroll_basename("-Test").is_well_formed());
    }

    #[test]
    fn section_inline_chain_is_root_first() {
        let decoded = decode_section_basename("sweet-pie");
        assert_eq!(decoded.inline_chain, chain(&["sweet"]));
        assert_eq!(decoded.name, "pie");

        let plain = decode_section_basename("pies");
        assert!(plain.inline_chain.is_empty());
        assert_eq!(plain.name, "pies");
        assert!(!decode_section_basename("pie-").is_well_formed());
    }

    #[test]
    fn nested_section_reads_against_its_folder() {
        let folder_chain = chain(&["Test", "parent"]);

        let root_first = decode_section_basename_in("Test-parent-child", &folder_chain);
        assert_eq!(root_first.inline_chain, folder_chain);
        assert_eq!(root_first.name, "child");

        let nearest_first = decode_section_basename_in("child-parent-Test", &folder_chain);
        assert_eq!(nearest_first.inline_chain, folder_chain);
        assert_eq!(nearest_first.name, "child");

        let elsewhere = decode_section_basename_in("Other-child", &folder_chain);
        assert_eq!(elsewhere.inline_chain, chain(&["Other"]));
        assert_eq!(elsewhere.name, "child");
    }
}
