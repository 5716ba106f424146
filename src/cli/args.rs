//! CLI argument definitions using clap
//!
//! Commands:
//! - docfilter filter --predicate <json> [--default skip|include|raise]
//! - docfilter explain --predicate <json>

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::filter::DefaultPolicy;

/// docfilter - filter JSON documents with patterns and expressions
#[derive(Parser, Debug)]
#[command(name = "docfilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the predicate comes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PredicateSource {
    /// Predicate in JSON wire form, e.g. '{"pattern": {"age": 30}}'
    #[arg(long)]
    pub predicate: Option<String>,

    /// File containing the predicate in JSON wire form
    #[arg(long)]
    pub predicate_file: Option<PathBuf>,
}

/// Layout of the document input and output
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// One JSON document per line, filtered as a lazy stream
    Ndjson,
    /// A single JSON array, filtered as a materialized array
    Array,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter documents and write the matching ones to stdout
    Filter {
        #[command(flatten)]
        source: PredicateSource,

        /// What to do with documents missing a field the predicate needs
        #[arg(long, value_enum)]
        default: Option<DefaultPolicy>,

        /// Input file (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Input and output layout
        #[arg(long, value_enum, default_value_t = DocumentFormat::Ndjson)]
        format: DocumentFormat,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse a predicate and print its normalized form
    Explain {
        #[command(flatten)]
        source: PredicateSource,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let cli = Cli::try_parse_from([
            "docfilter",
            "filter",
            "--predicate",
            r#"{"pattern": {"age": 30}}"#,
            "--default",
            "raise",
            "--format",
            "array",
        ])
        .unwrap();

        match cli.command {
            Command::Filter {
                source,
                default,
                format,
                ..
            } => {
                assert!(source.predicate.is_some());
                assert_eq!(default, Some(DefaultPolicy::RaiseOnMissing));
                assert_eq!(format, DocumentFormat::Array);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_predicate_required() {
        assert!(Cli::try_parse_from(["docfilter", "filter"]).is_err());
    }

    #[test]
    fn test_predicate_sources_conflict() {
        assert!(Cli::try_parse_from([
            "docfilter",
            "explain",
            "--predicate",
            "{}",
            "--predicate-file",
            "p.json",
        ])
        .is_err());
    }

    #[test]
    fn test_default_format_is_ndjson() {
        let cli = Cli::try_parse_from(["docfilter", "filter", "--predicate", "{}"]).unwrap();
        match cli.command {
            Command::Filter { format, default, .. } => {
                assert_eq!(format, DocumentFormat::Ndjson);
                assert_eq!(default, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
