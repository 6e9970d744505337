pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::PathBuf;

// Re-export commonly used types
pub use error::JanitorError;
pub use models::{Configuration, FileEntry, MatchRule, CONFIG_FILE_NAME};
pub use services::{
    run_cycle, run_scheduler, CycleReport, SchedulerOptions, SchedulerSummary,
};
pub use utils::{enumerate, relocate, RelocateResult};

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `parameters.conf`
    pub config_dir: PathBuf,
    pub scheduler: SchedulerOptions,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            scheduler: SchedulerOptions::default(),
            log_level: "info".to_string(),
        }
    }
}
