use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::PipelineError;
use crate::models::{AnnotationRecord, Dataset};

/// List the regular files of an annotation directory, sorted by file name
pub fn list_annotation_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(directory)
        .with_context(|| format!("Failed to read annotation directory: {:?}", directory))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {:?}", directory))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {:?}", entry.path()))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read an annotation file as `(line_number, line)` pairs, 1-based,
/// dropping the first `header_lines` lines
pub fn read_annotation_lines(path: &Path, header_lines: usize) -> Result<Vec<(usize, String)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    Ok(content
        .lines()
        .enumerate()
        .skip(header_lines)
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect())
}

/// Load a merged table written by the normalizer
pub fn read_merged_table(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open merged table: {:?}", path))?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read merged table: {:?}", path))?;
        // Row 1 is the header
        let fields: Vec<&str> = row.iter().collect();
        let record = AnnotationRecord::from_fields(&fields).map_err(|reason| {
            PipelineError::MalformedRow {
                path: path.to_path_buf(),
                row: index + 2,
                reason,
            }
        })?;
        records.push(record);
    }

    Ok(Dataset::new(records))
}
