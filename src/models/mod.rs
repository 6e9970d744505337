pub mod configuration;
pub mod file_entry;
pub mod match_rule;

pub use configuration::{Configuration, CONFIG_FILE_NAME};
pub use file_entry::FileEntry;
pub use match_rule::MatchRule;
