pub mod file_operations;

pub use file_operations::{destination_for, enumerate, move_file, relocate, RelocateResult};
