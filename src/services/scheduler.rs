use crate::models::Configuration;
use crate::services::scan_cycle::{run_cycle, CycleReport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Options for the polling loop that are not part of `parameters.conf`
#[derive(Debug, Clone, Default)]
pub struct SchedulerOptions {
    /// Directory base names whose subtrees are never scanned
    pub skip_dirs: Vec<String>,
    /// Stop after this many cycles; `None` polls until cancelled
    pub max_cycles: Option<u64>,
}

/// Totals over every cycle the loop ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub matches: usize,
    pub relocated: usize,
    /// Moves that had to replace an existing destination file
    pub retried: usize,
    pub abandoned: usize,
}

impl SchedulerSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.matches += report.matches;
        self.relocated += report.relocated;
        self.retried += report.retried;
        self.abandoned += report.abandoned;
    }

    pub fn success_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.relocated as f64 / self.matches as f64
        }
    }
}

/// Poll forever: scan, move matches, sleep the configured interval, repeat.
///
/// Cycles are strictly sequential and each one runs to completion on the
/// blocking pool. The loop ends only when `token` is cancelled (checked
/// between cycles and during the sleep) or `max_cycles` is reached.
pub async fn run_scheduler(
    config: Arc<Configuration>,
    options: SchedulerOptions,
    token: CancellationToken,
) -> SchedulerSummary {
    info!(
        "Polling {:?} every {:?}, moving matches to {:?}",
        config.search_root,
        config.interval(),
        config.destination_root
    );

    let skip_dirs: Arc<[String]> = options.skip_dirs.into();
    let mut summary = SchedulerSummary::default();

    while !token.is_cancelled() {
        let cycle_config = Arc::clone(&config);
        let cycle_skip_dirs = Arc::clone(&skip_dirs);

        match tokio::task::spawn_blocking(move || run_cycle(&cycle_config, &cycle_skip_dirs)).await {
            Ok(report) => summary.absorb(&report),
            Err(e) => {
                error!("Scan cycle {} failed: {}", summary.cycles + 1, e);
                summary.failed_cycles += 1;
            }
        }
        summary.cycles += 1;

        if options.max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(config.interval()) => {}
        }
    }

    info!(
        "Stopped after {} cycles. Moved: {}, Abandoned: {}",
        summary.cycles, summary.relocated, summary.abandoned
    );

    summary
}
