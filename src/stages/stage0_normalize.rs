use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::io::{list_annotation_files, read_annotation_lines, write_merged_table};
use crate::models::{AnnotationRecord, COLUMN_COUNT};

/// Number of raw cells an annotation line must provide
pub const ANNOTATION_CELLS: usize = 6;

/// Configuration for Stage 0 normalization
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Marker opening a whole-line or end-of-line comment (matched lowercased)
    pub comment_marker: String,
    /// Lines dropped at the top of every annotation file
    pub header_lines: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            comment_marker: "xxx".to_string(),
            header_lines: 0,
        }
    }
}

/// Result of Stage 0 normalization
#[derive(Debug)]
pub struct NormalizationResult {
    /// Records in file order, then line order
    pub records: Vec<AnnotationRecord>,
    /// Annotation files read
    pub files_processed: usize,
    /// Empty and comment-only lines
    pub lines_skipped: usize,
    /// Records flagged `not_vague` together with a vague dimension
    pub inconsistent_vagueness: usize,
    /// Where the merged table was written
    pub output_path: PathBuf,
}

/// Lowercase and trim a raw line, dropping comments
///
/// Returns `None` for lines with nothing left to parse.
pub fn clean_line(raw: &str, comment_marker: &str) -> Option<String> {
    let line = raw.trim().to_lowercase();
    if line.is_empty() || line.starts_with(comment_marker) {
        return None;
    }

    let line = match line.find(comment_marker) {
        Some(index) => line[..index].trim().to_string(),
        None => line,
    };

    if line.is_empty() { None } else { Some(line) }
}

/// Parse a cleaned annotation line into a record
pub fn parse_annotation_line(
    line: &str,
    path: &Path,
    line_number: usize,
) -> Result<AnnotationRecord, PipelineError> {
    let malformed = |found: usize, expected: usize| PipelineError::MalformedRecord {
        path: path.to_path_buf(),
        line_number,
        line: line.to_string(),
        found,
        expected,
    };

    let cells: Vec<&str> = line.split('\t').collect();
    if cells.len() < ANNOTATION_CELLS {
        return Err(malformed(cells.len(), ANNOTATION_CELLS));
    }

    let record =
        AnnotationRecord::from_cells(cells[0], cells[1], cells[2], cells[3], cells[4], cells[5]);

    let width = record.to_fields().len();
    if width != COLUMN_COUNT {
        return Err(malformed(width, COLUMN_COUNT));
    }

    Ok(record)
}

/// Perform Stage 0: merge every annotation file into one table
///
/// This stage:
/// 1. Reads the annotation files in file-name order
/// 2. Drops empty lines and comments
/// 3. Decodes each line into a one-hot record, aborting on the first malformed line
/// 4. Writes the merged table, overwriting `output_path`
pub fn normalize(
    directory: &Path,
    output_path: &Path,
    config: &NormalizeConfig,
) -> Result<NormalizationResult> {
    info!("Preparing data from {:?}", directory);

    let files = list_annotation_files(directory)?;
    let mut records = Vec::new();
    let mut lines_skipped = 0;
    let mut inconsistent_vagueness = 0;

    for path in &files {
        let lines = read_annotation_lines(path, config.header_lines)?;
        let before = records.len();

        for (line_number, raw) in lines {
            let Some(line) = clean_line(&raw, &config.comment_marker) else {
                lines_skipped += 1;
                continue;
            };

            let record = parse_annotation_line(&line, path, line_number)?;

            if record.has_inconsistent_vagueness() {
                warn!(
                    "Inconsistent vagueness in {:?}, line {}: not_vague set together with a vague dimension",
                    path, line_number
                );
                inconsistent_vagueness += 1;
            }

            records.push(record);
        }

        debug!("{:?}: {} records", path, records.len() - before);
    }

    info!("Saving {} records to {:?}", records.len(), output_path);
    write_merged_table(output_path, &records)?;
    info!("Data from {:?} have been processed in {:?}", directory, output_path);

    Ok(NormalizationResult {
        records,
        files_processed: files.len(),
        lines_skipped,
        inconsistent_vagueness,
        output_path: output_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Manifestation, Plurality, Vagueness};

    fn write_file(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("   ", "xxx"), None);
        assert_eq!(clean_line("XXX whole line comment", "xxx"), None);
        assert_eq!(
            clean_line("Tall Men\tclass  xxx check this", "xxx"),
            Some("tall men\tclass".to_string())
        );
        assert_eq!(clean_line("a\tb", "xxx"), Some("a\tb".to_string()));
    }

    #[test]
    fn test_parse_annotation_line() {
        let line = "the eiffel tower\tinstance\tplace\tcontains_named determined\tnoun\tnot_vague";
        let record = parse_annotation_line(line, Path::new("a.tsv"), 3).unwrap();

        assert_eq!(record.expression, "the eiffel tower");
        assert_eq!(record.plurality, Plurality::Instance);
        assert_eq!(record.semantic_class, "place");
        assert!(record.has_manifestation(Manifestation::ContainsNamed));
        assert!(!record.has_manifestation(Manifestation::Named));
        assert!(record.has_manifestation(Manifestation::Determined));
        assert!(record.has_vagueness(Vagueness::NotVague));
        assert_eq!(record.to_fields().len(), COLUMN_COUNT);
    }

    #[test]
    fn test_short_line_is_fatal() {
        let err = parse_annotation_line("tall men\tclass\tperson", Path::new("bad.tsv"), 7)
            .unwrap_err();
        match &err {
            PipelineError::MalformedRecord {
                path,
                line_number,
                line,
                found,
                expected,
            } => {
                assert_eq!(path, Path::new("bad.tsv"));
                assert_eq!(*line_number, 7);
                assert_eq!(line, "tall men\tclass\tperson");
                assert_eq!(*found, 3);
                assert_eq!(*expected, ANNOTATION_CELLS);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("bad.tsv"));
    }

    #[test]
    fn test_normalize_skips_comments_across_files() {
        let input = tempfile::tempdir().unwrap();
        write_file(
            input.path(),
            "b.tsv",
            "xxx reviewer notes\nparis\tinstance\tplace\tnamed\t\tnot_vague\n",
        );
        write_file(
            input.path(),
            "a.tsv",
            "Many Tall People\tclass\tperson\tundetermined\tadjective\tdegree xxx borderline\nxxx done\n",
        );
        let output = tempfile::tempdir().unwrap();
        let table = output.path().join("dataset.tsv");

        let result = normalize(input.path(), &table, &NormalizeConfig::default()).unwrap();

        assert_eq!(result.files_processed, 2);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.lines_skipped, 2);
        assert_eq!(result.records[0].expression, "many tall people");
        assert_eq!(result.records[1].expression, "paris");

        let content = std::fs::read_to_string(&table).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.split('\t').count() == COLUMN_COUNT));
    }

    #[test]
    fn test_normalize_counts_inconsistent_vagueness() {
        let input = tempfile::tempdir().unwrap();
        write_file(
            input.path(),
            "a.tsv",
            "big house\tinstance\tplace\tdetermined\tadjective\tdegree not_vague\n",
        );
        let output = tempfile::tempdir().unwrap();

        let result = normalize(
            input.path(),
            &output.path().join("dataset.tsv"),
            &NormalizeConfig::default(),
        )
        .unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.inconsistent_vagueness, 1);
    }

    #[test]
    fn test_normalize_aborts_without_writing() {
        let input = tempfile::tempdir().unwrap();
        write_file(input.path(), "a.tsv", "ok\tclass\tperson\t\t\tdegree\nbroken line\n");
        let output = tempfile::tempdir().unwrap();
        let table = output.path().join("dataset.tsv");

        let err = normalize(input.path(), &table, &NormalizeConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MalformedRecord { line_number: 2, .. })
        ));
        assert!(!table.exists());
    }

    #[test]
    fn test_header_lines_are_dropped() {
        let input = tempfile::tempdir().unwrap();
        write_file(
            input.path(),
            "a.tsv",
            "expression\tplurality\tclass\tmanifestation\tmodifiers\tvagueness\nold men\tclass\tperson\t\tadjective\tdegree\n",
        );
        let output = tempfile::tempdir().unwrap();
        let config = NormalizeConfig {
            header_lines: 1,
            ..Default::default()
        };

        let result = normalize(input.path(), &output.path().join("d.tsv"), &config).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].expression, "old men");
    }
}
