use crate::error::{JanitorError, Result};
use std::path::{Path, PathBuf};

/// A file found under the search root during one scan cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Path relative to the search root, reused as the destination name
    pub relative: PathBuf,
}

impl FileEntry {
    pub fn from_path<P: AsRef<Path>, Q: AsRef<Path>>(root: P, path: Q) -> Result<Self> {
        let (root, path) = (root.as_ref(), path.as_ref());

        let relative = path
            .strip_prefix(root)
            .map_err(|_| JanitorError::OutsideSearchRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })?
            .to_path_buf();

        Ok(Self {
            path: path.to_path_buf(),
            relative,
        })
    }

    /// Full path as the string the match rules are tested against
    pub fn path_str(&self) -> std::borrow::Cow<'_, str> {
        self.path.to_string_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_keeps_subdirectories() {
        let entry = FileEntry::from_path("/data/in", "/data/in/2024/report.txt").unwrap();
        assert_eq!(entry.relative, PathBuf::from("2024/report.txt"));
        assert_eq!(entry.path_str(), "/data/in/2024/report.txt");
    }

    #[test]
    fn test_trailing_separator_on_root() {
        let entry = FileEntry::from_path("/data/in/", "/data/in/report.txt").unwrap();
        assert_eq!(entry.relative, PathBuf::from("report.txt"));
    }

    #[test]
    fn test_path_outside_root_is_rejected() {
        let err = FileEntry::from_path("/data/in", "/data/other/report.txt").unwrap_err();
        assert!(matches!(err, JanitorError::OutsideSearchRoot { .. }));
    }
}
