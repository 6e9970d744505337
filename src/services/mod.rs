pub mod scan_cycle;
pub mod scheduler;

pub use scan_cycle::{run_cycle, CycleReport};
pub use scheduler::{run_scheduler, SchedulerOptions, SchedulerSummary};
