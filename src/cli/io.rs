//! JSON I/O handling for CLI
//!
//! - NDJSON input: one document per line, blank lines ignored, read lazily
//! - Array input: a single JSON array, read whole
//! - Output mirrors the input layout
//! - UTF-8 only

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde_json::Value;

use crate::filter::{DocumentStream, FilterError};

use super::errors::{CliError, CliResult};

/// Opens the input file, or stdin when no path is given
pub fn open_input(path: Option<&Path>) -> CliResult<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                CliError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to open {}: {}", path.display(), e),
                ))
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Lazily parses NDJSON documents from `reader`.
///
/// A read or parse failure becomes a source error and ends the stream.
/// Error positions count documents, not lines; blank lines are skipped and
/// the line number only appears in the message.
pub fn ndjson_stream<'a, R: BufRead + 'a>(reader: R) -> DocumentStream<'a> {
    let mut position = 0;
    Box::new(
        reader
            .lines()
            .enumerate()
            .filter_map(move |(line_index, line)| {
                let item = match line {
                    Ok(text) if text.trim().is_empty() => return None,
                    Ok(text) => serde_json::from_str::<Value>(&text).map_err(|e| {
                        FilterError::source(position, format!("line {}: {}", line_index + 1, e))
                    }),
                    Err(e) => Err(FilterError::source(
                        position,
                        format!("line {}: {}", line_index + 1, e),
                    )),
                };
                position += 1;
                Some(item)
            }),
    )
}

/// Reads a single JSON array of documents
pub fn read_array<R: BufRead>(reader: R) -> CliResult<Vec<Value>> {
    match serde_json::from_reader::<_, Value>(reader)? {
        Value::Array(documents) => Ok(documents),
        _ => Err(CliError::input("expected a JSON array of documents")),
    }
}

/// Writes one document as an NDJSON line
pub fn write_document<W: Write>(writer: &mut W, document: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, document)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes documents as a single JSON array
pub fn write_array<W: Write>(writer: &mut W, documents: &[Value]) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, documents)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a raw JSON value to stdout, pretty-printed
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
