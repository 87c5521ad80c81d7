//! File driver: iterates the obfuscated log row by row and writes the
//! reconstructed output. Rows are processed strictly in file order, one
//! lookup round-trip at a time.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ResolveError, Result};
use crate::resolver::RowResolver;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub rows: u64,
}

/// Resolve `input` into `output`. Opening either file is fatal; everything
/// past that degrades per token inside the resolver.
pub async fn resolve_log_file(
    resolver: &RowResolver,
    input: &Path,
    output: &Path,
    field_delimiter: u8,
) -> Result<RunStats> {
    let infile = File::open(input).map_err(|source| ResolveError::InputOpen {
        path: input.to_path_buf(),
        source,
    })?;
    let outfile = File::create(output).map_err(|source| ResolveError::OutputOpen {
        path: output.to_path_buf(),
        source,
    })?;

    // Quoting off: the log format has no quote semantics, only literal
    // apostrophes the resolver strips itself.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(field_delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(infile);
    let mut writer = BufWriter::new(outfile);

    let mut stats = RunStats::default();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = resolver.resolve_row(record.iter()).await;
        writer.write_all(line.as_bytes())?;
        stats.rows += 1;
    }
    writer.flush()?;

    tracing::info!(
        rows = stats.rows,
        input = %input.display(),
        output = %output.display(),
        "audit log resolved"
    );
    Ok(stats)
}
