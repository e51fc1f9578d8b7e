use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{header, AnnotationRecord, RunDate};

/// Write the merged table: header row then one row per record, tab-separated
pub fn write_merged_table(path: &Path, records: &[AnnotationRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;

    writer
        .write_record(header())
        .with_context(|| format!("Failed to write header to {:?}", path))?;
    for record in records {
        writer
            .write_record(record.to_fields())
            .with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer.flush()?;
    Ok(())
}

/// Path of a dated report, `<YYYYMMDD> <description>.<extension>`
pub fn report_path(dir: &Path, date: &RunDate, description: &str, extension: &str) -> PathBuf {
    dir.join(format!("{} {}.{}", date.stamp(), description, extension))
}

/// Write text lines to a file, each terminated by a newline
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line.as_ref())
            .with_context(|| format!("Failed to write {:?}", path))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as a comma-separated file with the given header
pub fn write_csv<R: AsRef<[String]>>(path: &Path, header: &[&str], rows: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.as_ref())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a value as pretty JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}
