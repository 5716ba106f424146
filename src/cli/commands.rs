//! CLI command implementations
//!
//! `filter` streams NDJSON input through the evaluator one document at a
//! time, so output starts before input ends and an abort leaves everything
//! emitted so far on stdout. `array` input is read whole and filtered eagerly.

use std::fs;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::filter::{DefaultPolicy, Filter, FilterOptions, FilterStats};
use crate::predicate::Predicate;

use super::args::{Command, DocumentFormat, PredicateSource};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{ndjson_stream, open_input, read_array, write_array, write_document, write_json};

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Filter {
            source,
            default,
            input,
            format,
            config,
        } => filter(&source, default, input.as_deref(), format, config.as_deref()),
        Command::Explain { source, config } => explain(&source, config.as_deref()),
    }
}

/// Installs the stderr log subscriber. RUST_LOG wins over `level`.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second install (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Reads the predicate from the flag or the file
pub fn load_predicate(source: &PredicateSource) -> CliResult<Predicate> {
    match (&source.predicate, &source.predicate_file) {
        (Some(text), _) => Ok(Predicate::from_json_str(text)?),
        (None, Some(path)) => {
            let text = fs::read_to_string(path)?;
            Ok(Predicate::from_json_str(&text)?)
        }
        (None, None) => Err(CliError::config("a predicate is required")),
    }
}

/// Filter command: documents in, matching documents out
pub fn filter(
    source: &PredicateSource,
    default: Option<DefaultPolicy>,
    input: Option<&Path>,
    format: DocumentFormat,
    config_path: Option<&Path>,
) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    init_logging(&config.log_level);

    let predicate = load_predicate(source)?;
    let options = FilterOptions::with_default(default.unwrap_or(config.default_policy));
    let filter = Filter::with_max_depth(predicate, options, config.max_expression_depth)?;

    let reader = open_input(input)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let stats = run_filter(&filter, reader, format, &mut out)?;
    out.flush()?;

    info!(
        policy = %options.default,
        kind = filter.predicate().kind(),
        scanned = stats.scanned,
        emitted = stats.emitted,
        rejected = stats.rejected,
        missing_skipped = stats.missing_skipped,
        missing_included = stats.missing_included,
        "filter complete"
    );

    Ok(())
}

/// Runs `filter` over `reader`, writing matches to `out` in `format`
pub fn run_filter<R: BufRead, W: Write>(
    filter: &Filter,
    reader: R,
    format: DocumentFormat,
    out: &mut W,
) -> CliResult<FilterStats> {
    match format {
        DocumentFormat::Ndjson => {
            let mut stream = filter.stream(ndjson_stream(reader));
            for item in stream.by_ref() {
                write_document(out, &item?)?;
            }
            Ok(stream.stats())
        }
        DocumentFormat::Array => {
            let output = filter.filter_array(read_array(reader)?)?;
            write_array(out, &output.documents)?;
            Ok(output.stats)
        }
    }
}

/// Explain command: print the normalized predicate
pub fn explain(source: &PredicateSource, config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::load_or_default(config_path)?;
    init_logging(&config.log_level);

    let predicate = load_predicate(source)?;
    write_json(&describe(&predicate, config.max_expression_depth))
}

/// Explain output for a predicate
pub fn describe(predicate: &Predicate, max_depth: usize) -> serde_json::Value {
    json!({
        "kind": predicate.kind(),
        "depth": predicate.depth(),
        "max_depth": max_depth,
        "accepted": predicate.depth() <= max_depth,
        "predicate": predicate.to_json(),
    })
}
