pub mod commands;
pub mod output;

pub use commands::{apply_overrides, run, CliCommand, Overrides};
pub use output::print_json;
