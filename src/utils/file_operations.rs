use crate::error::{JanitorError, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Recursively list every entry under `root`, pruning directories whose
/// base name is in `skip_names` (their contents are never visited).
///
/// A root that is missing or not a directory yields an empty list. An entry
/// that cannot be read is logged and skipped; traversal carries on with its
/// siblings.
pub fn enumerate<P: AsRef<Path>>(root: P, skip_names: &[String]) -> Vec<PathBuf> {
    let root = root.as_ref();

    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry, skip_names))
        .filter_map(|result| match result {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                warn!(
                    "Error while accessing {}: {}",
                    e.path().unwrap_or(root).display(),
                    e
                );
                None
            }
        })
        .collect()
}

fn is_skipped_dir(entry: &DirEntry, skip_names: &[String]) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| skip_names.iter().any(|skip| skip == name))
            .unwrap_or(false)
}

/// Destination of a file: its path relative to the search root, re-rooted
/// under the destination directory.
pub fn destination_for<P: AsRef<Path>, Q: AsRef<Path>>(destination_root: P, relative: Q) -> PathBuf {
    destination_root.as_ref().join(relative)
}

/// Move `source` to `destination_root/relative`, overwriting whatever is there.
///
/// One attempt is made; if it fails the destination is deleted (errors
/// ignored) and exactly one more attempt follows. A second failure abandons
/// the file for this cycle. Nothing is touched when the source is already gone.
pub fn relocate<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    source: P,
    destination_root: Q,
    relative: R,
) -> RelocateResult {
    let source = source.as_ref().to_path_buf();
    let destination = destination_for(destination_root, relative);

    if fs::symlink_metadata(&source).is_err() {
        return RelocateResult::SourceMissing { source };
    }

    if is_same_file(&source, &destination) {
        return RelocateResult::Abandoned {
            error: JanitorError::SamePath { path: source.clone() }.to_string(),
            source,
            destination,
        };
    }

    let retried = match move_file(&source, &destination) {
        Ok(()) => false,
        Err(first) => {
            if first.is_collision() {
                debug!("{} already exists, replacing it", destination.display());
            } else {
                debug!(
                    "Moving {} failed ({}), clearing destination and retrying",
                    source.display(),
                    first
                );
            }
            let _ = fs::remove_file(&destination);

            if let Err(e) = move_file(&source, &destination) {
                return RelocateResult::Abandoned {
                    source,
                    destination,
                    error: e.to_string(),
                };
            }
            true
        }
    };

    info!("{} transferred to {}", source.display(), destination.display());

    RelocateResult::Moved {
        source,
        destination,
        retried,
    }
}

/// A single move attempt. Refuses to replace an existing destination; tries
/// an atomic rename first and falls back to copy + delete (e.g. across
/// filesystems).
pub fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if fs::symlink_metadata(destination).is_ok() {
        return Err(JanitorError::DestinationExists {
            path: destination.to_path_buf(),
        });
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| JanitorError::io("create directory", parent, e))?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                source.display(),
                destination.display(),
                e
            );
            copy_then_remove(source, destination)
        }
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> Result<()> {
    let mut reader = File::open(source).map_err(|e| JanitorError::io("open", source, e))?;

    if !reader
        .metadata()
        .map_err(|e| JanitorError::io("stat", source, e))?
        .is_file()
    {
        return Err(JanitorError::io(
            "copy",
            source,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| JanitorError::io("create", destination, e))?;

    io::copy(&mut reader, &mut writer).map_err(|e| JanitorError::io("copy", destination, e))?;

    if let Ok(metadata) = reader.metadata() {
        let _ = writer.set_permissions(metadata.permissions());
    }

    drop(writer);
    drop(reader);

    fs::remove_file(source).map_err(|e| JanitorError::io("remove", source, e))
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Result of a single relocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocateResult {
    Moved {
        source: PathBuf,
        destination: PathBuf,
        retried: bool,
    },
    SourceMissing {
        source: PathBuf,
    },
    Abandoned {
        source: PathBuf,
        destination: PathBuf,
        error: String,
    },
}

impl RelocateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RelocateResult::Moved { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RelocateResult::Abandoned { .. })
    }

    pub fn source(&self) -> &Path {
        match self {
            RelocateResult::Moved { source, .. }
            | RelocateResult::SourceMissing { source }
            | RelocateResult::Abandoned { source, .. } => source,
        }
    }
}
