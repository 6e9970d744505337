use crate::models::{Configuration, FileEntry};
use crate::utils::{enumerate, relocate, RelocateResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One scan cycle: enumerate the search root, test every file against the
/// active rules and relocate each match.
///
/// Infallible by construction: per-entry and per-file failures end up in the
/// report, never in an error.
pub fn run_cycle(config: &Configuration, skip_names: &[String]) -> CycleReport {
    let started = Instant::now();
    let mut report = CycleReport::empty();

    let rules = config.active_rules();
    let entries = enumerate(&config.search_root, skip_names);
    report.entries_scanned = entries.len();

    let destination_root = config.destination_root.as_path();
    if !rules.is_empty() && destination_root.as_os_str().is_empty() {
        warn!("No destination directory configured, nothing will be moved");
        return report.finish(started);
    }

    let nested = NestedDestination::resolve(&config.search_root, destination_root);

    for path in entries {
        if path.is_dir() {
            continue;
        }

        let entry = match FileEntry::from_path(&config.search_root, &path) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry: {}", e);
                continue;
            }
        };

        if nested.contains(&entry) {
            continue;
        }
        report.files_considered += 1;

        let path_str = entry.path_str();
        for rule in rules.iter().filter(|rule| rule.matches(&path_str)) {
            debug!("{} matched {}", entry.path.display(), rule);
            report.matches += 1;
            report.record(relocate(&entry.path, destination_root, &entry.relative));
        }
    }

    report.finish(started)
}

/// Destination root as seen from the search root, so files already moved
/// into a destination nested under the search root are left where they are.
///
/// Both roots are resolved once per cycle; `.` and `out` must still catch
/// `./out/a.txt`. A root that cannot be resolved is compared as written.
struct NestedDestination<'a> {
    search_root: PathBuf,
    destination_root: PathBuf,
    written: &'a Path,
}

impl<'a> NestedDestination<'a> {
    fn resolve(search_root: &Path, destination_root: &'a Path) -> Self {
        Self {
            search_root: canonical_or_written(search_root),
            destination_root: canonical_or_written(destination_root),
            written: destination_root,
        }
    }

    fn contains(&self, entry: &FileEntry) -> bool {
        if self.written.as_os_str().is_empty() {
            return false;
        }

        entry.path.starts_with(self.written)
            || self
                .search_root
                .join(&entry.relative)
                .starts_with(&self.destination_root)
    }
}

fn canonical_or_written(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Report of a single scan cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub entries_scanned: usize,
    pub files_considered: usize,
    pub matches: usize,
    pub relocated: usize,
    pub retried: usize,
    pub source_missing: usize,
    pub abandoned: usize,
    pub relocations: Vec<RelocateResult>,
}

impl CycleReport {
    pub fn empty() -> Self {
        Self {
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            entries_scanned: 0,
            files_considered: 0,
            matches: 0,
            relocated: 0,
            retried: 0,
            source_missing: 0,
            abandoned: 0,
            relocations: Vec::new(),
        }
    }

    fn record(&mut self, result: RelocateResult) {
        match &result {
            RelocateResult::Moved { retried, .. } => {
                self.relocated += 1;
                if *retried {
                    self.retried += 1;
                }
            }
            RelocateResult::SourceMissing { source } => {
                self.source_missing += 1;
                debug!("{} already gone, nothing to move", source.display());
            }
            RelocateResult::Abandoned {
                source,
                destination,
                error,
            } => {
                self.abandoned += 1;
                debug!(
                    "Gave up moving {} to {}: {}",
                    source.display(),
                    destination.display(),
                    error
                );
            }
        }
        self.relocations.push(result);
    }

    fn finish(mut self, started: Instant) -> Self {
        self.elapsed = started.elapsed();
        debug!(
            "Cycle started {} done in {:?}. Scanned: {}, Files: {}, Matches: {}, Moved: {} ({} replaced), Abandoned: {}, Success rate: {:.2}%",
            self.started_at.to_rfc3339(),
            self.elapsed,
            self.entries_scanned,
            self.files_considered,
            self.matches,
            self.relocated,
            self.retried,
            self.abandoned,
            self.success_rate() * 100.0
        );
        self
    }

    /// No relocation was even attempted
    pub fn is_noop(&self) -> bool {
        self.relocations.is_empty()
    }

    pub fn success_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.relocated as f64 / self.matches as f64
        }
    }
}
