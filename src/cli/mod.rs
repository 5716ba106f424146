//! CLI module for docfilter
//!
//! Provides command-line interface for:
//! - filter: Filter NDJSON or array input with a predicate
//! - explain: Print the normalized form of a predicate

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, DocumentFormat, PredicateSource};
pub use commands::{
    describe, explain, filter, init_logging, load_predicate, run_command, run_filter,
};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::{ndjson_stream, open_input, read_array, write_array, write_document};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
