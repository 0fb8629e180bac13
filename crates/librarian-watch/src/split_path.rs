//! Structured vault paths.
//!
//! Paths travel through the pipeline as folder segments plus a basename and a
//! kind, never as raw strings, so prefix and suffix comparisons are exact.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extension that marks a markdown note.
pub const MD_EXTENSION: &str = "md";

/// What a [`SplitPath`] points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitPathKind {
    /// A folder.
    Folder,
    /// A non-markdown file.
    File {
        /// Extension without the dot, if any.
        extension: Option<String>,
    },
    /// A markdown note (`.md`).
    MdFile,
}

/// A vault path split into its parts.
///
/// Two paths are equal iff segments, basename and kind (including extension)
/// all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitPath {
    /// Folder names from the vault root down to the parent.
    pub segments: Vec<String>,
    /// Final name, without extension for files.
    pub basename: String,
    /// Folder, file or markdown file.
    pub kind: SplitPathKind,
}

impl SplitPath {
    /// Path to a folder.
    pub fn folder(segments: Vec<String>, basename: impl Into<String>) -> Self {
        Self {
            segments,
            basename: basename.into(),
            kind: SplitPathKind::Folder,
        }
    }

    /// Path to a file. An `md` extension yields a markdown file.
    pub fn file(segments: Vec<String>, basename: impl Into<String>, extension: Option<&str>) -> Self {
        let kind = match extension {
            Some(MD_EXTENSION) => SplitPathKind::MdFile,
            other => SplitPathKind::File {
                extension: other.map(str::to_string),
            },
        };
        Self {
            segments,
            basename: basename.into(),
            kind,
        }
    }

    /// Path to a markdown note.
    pub fn md_file(segments: Vec<String>, basename: impl Into<String>) -> Self {
        Self {
            segments,
            basename: basename.into(),
            kind: SplitPathKind::MdFile,
        }
    }

    /// Parse a vault-relative path string.
    ///
    /// Both `/` and `\` separate components; empty and `.` components are
    /// dropped. `..` and paths naming nothing are rejected.
    pub fn parse(path: &str, is_folder: bool) -> Result<Self> {
        let mut components: Vec<String> = Vec::new();
        for component in path.split(['/', '\\']) {
            match component {
                "" | "." => continue,
                ".." => return Err(Error::InvalidPath(path.to_string())),
                other => components.push(other.to_string()),
            }
        }

        let name = components
            .pop()
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;

        if is_folder {
            return Ok(Self::folder(components, name));
        }

        match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
                Ok(Self::file(components, stem, Some(extension)))
            }
            _ => Ok(Self::file(components, name, None)),
        }
    }

    /// Whether this path points at a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, SplitPathKind::Folder)
    }

    /// Whether this path points at a file of any kind.
    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    /// Whether both paths are folders or both are files.
    pub fn same_category(&self, other: &SplitPath) -> bool {
        self.is_folder() == other.is_folder()
    }

    /// Extension without the dot.
    pub fn extension(&self) -> Option<&str> {
        match &self.kind {
            SplitPathKind::Folder => None,
            SplitPathKind::File { extension } => extension.as_deref(),
            SplitPathKind::MdFile => Some(MD_EXTENSION),
        }
    }

    /// Final path component, including the extension.
    pub fn file_name(&self) -> String {
        match self.extension() {
            Some(extension) => format!("{}.{}", self.basename, extension),
            None => self.basename.clone(),
        }
    }

    /// Every component name from the vault root down to this entry.
    ///
    /// For a folder this is the prefix its descendants' segments start with.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = self.segments.clone();
        chain.push(self.basename.clone());
        chain
    }

    /// Whether this path lies strictly below the folder named by `ancestor_chain`.
    pub fn is_under(&self, ancestor_chain: &[String]) -> bool {
        self.segments.len() >= ancestor_chain.len()
            && self.segments[..ancestor_chain.len()] == *ancestor_chain
    }

    /// Drop the first `count` segments.
    pub fn strip_leading(&self, count: usize) -> Self {
        Self {
            segments: self.segments.iter().skip(count).cloned().collect(),
            basename: self.basename.clone(),
            kind: self.kind.clone(),
        }
    }

    /// Prepend `prefix` to the segments.
    pub fn with_prefix(&self, prefix: &[String]) -> Self {
        let mut segments = prefix.to_vec();
        segments.extend(self.segments.iter().cloned());
        Self {
            segments,
            basename: self.basename.clone(),
            kind: self.kind.clone(),
        }
    }

    /// Render as a `/`-separated vault-relative string.
    pub fn to_path_string(&self) -> String {
        let mut parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        let file_name = self.file_name();
        parts.push(&file_name);
        parts.join("/")
    }
}

impl fmt::Display for SplitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())?;
        if self.is_folder() {
            write!(f, "/")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_markdown_note() {
        let path = SplitPath::parse("Library/Test/Note-Test.md", false).unwrap();
        assert_eq!(path.segments, segs(&["Library", "Test"]));
        assert_eq!(path.basename, "Note-Test");
        assert_eq!(path.kind, SplitPathKind::MdFile);
        assert_eq!(path.extension(), Some("md"));
    }

    #[test]
    fn parses_other_file_with_extension() {
        let path = SplitPath::parse("Library/img.png", false).unwrap();
        assert_eq!(path.basename, "img");
        assert_eq!(
            path.kind,
            SplitPathKind::File {
                extension: Some("png".to_string())
            }
        );
    }

    #[test]
    fn dotfiles_and_bare_names_have_no_extension() {
        let dotfile = SplitPath::parse(".obsidian/.hidden", false).unwrap();
        assert_eq!(dotfile.basename, ".hidden");
        assert_eq!(dotfile.extension(), None);

        let bare = SplitPath::parse("Makefile", false).unwrap();
        assert_eq!(bare.basename, "Makefile");
        assert!(bare.segments.is_empty());
    }

    #[test]
    fn folder_names_keep_their_dots() {
        let path = SplitPath::parse("Library/v1.2/", true).unwrap();
        assert_eq!(path.basename, "v1.2");
        assert!(path.is_folder());
        assert_eq!(path.extension(), None);
    }

    #[test]
    fn separators_and_dot_components_are_normalized() {
        let path = SplitPath::parse("./Library\\Section//note.md", false).unwrap();
        assert_eq!(path.segments, segs(&["Library", "Section"]));
        assert_eq!(path.to_path_string(), "Library/Section/note.md");
    }

    #[test]
    fn rejects_empty_and_parent_paths() {
        assert!(matches!(SplitPath::parse("", false), Err(Error::InvalidPath(_))));
        assert!(matches!(SplitPath::parse("/./", true), Err(Error::InvalidPath(_))));
        assert!(matches!(
            SplitPath::parse("Library/../x.md", false),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn equality_includes_kind_and_extension() {
        let md = SplitPath::parse("a/x.md", false).unwrap();
        let txt = SplitPath::parse("a/x.txt", false).unwrap();
        let folder = SplitPath::parse("a/x", true).unwrap();
        assert_ne!(md, txt);
        assert_ne!(SplitPath::parse("a/x", false).unwrap(), folder);
    }

    #[test]
    fn is_under_requires_full_prefix() {
        let path = SplitPath::parse("Library/Section/note.md", false).unwrap();
        assert!(path.is_under(&segs(&["Library"])));
        assert!(path.is_under(&segs(&["Library", "Section"])));
        assert!(!path.is_under(&segs(&["Library", "Section", "note"])));
        assert!(!path.is_under(&segs(&["Other"])));

        let root = SplitPath::parse("Library", true).unwrap();
        assert!(!root.is_under(&segs(&["Library"])));
    }

    #[test]
    fn prefix_strip_and_restore_round_trip() {
        let path = SplitPath::parse("Library/Section/note.md", false).unwrap();
        let stripped = path.strip_leading(1);
        assert_eq!(stripped.segments, segs(&["Section"]));
        assert_eq!(stripped.with_prefix(&segs(&["Library"])), path);
    }

    #[test]
    fn chain_appends_basename() {
        let folder = SplitPath::parse("Library/pie", true).unwrap();
        assert_eq!(folder.chain(), segs(&["Library", "pie"]));
        assert_eq!(folder.to_string(), "Library/pie/");
    }
}
