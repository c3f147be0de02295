//! Merging evaluation rows into the timestamped results table

use chrono::{DateTime, NaiveDateTime, Utc};
use review_eval_core::{Error, EvaluationRow, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const RESULTS_FILE_PREFIX: &str = "evaluation_results_";
pub const RESULTS_FILE_EXTENSION: &str = ".csv";
pub const RESULTS_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Human-readable form of the results file name, for error messages
pub const RESULTS_FILE_PATTERN: &str = "evaluation_results_<YYYY-MM-DDTHH-MM-SS>.csv";

/// Rows collected across (request, variant) pairs, in evaluation order
#[derive(Debug, Clone, Default)]
pub struct EvaluationAccumulator {
    rows: Vec<EvaluationRow>,
}

impl EvaluationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = EvaluationRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[EvaluationRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<EvaluationRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct variant names in first-appearance order
    pub fn variant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.variant_name.as_str()) {
                names.push(&row.variant_name);
            }
        }
        names
    }
}

pub fn results_file_name(timestamp: DateTime<Utc>) -> String {
    format!(
        "{RESULTS_FILE_PREFIX}{}{RESULTS_FILE_EXTENSION}",
        timestamp.format(RESULTS_TIMESTAMP_FORMAT)
    )
}

/// Timestamp embedded in a results file name, if the name follows the convention
pub fn parse_results_file_name(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name
        .strip_prefix(RESULTS_FILE_PREFIX)?
        .strip_suffix(RESULTS_FILE_EXTENSION)?;
    NaiveDateTime::parse_from_str(stamp, RESULTS_TIMESTAMP_FORMAT).ok()
}

/// Write the header and all rows as CSV.
///
/// The header is written even when there are no rows.
pub fn write_rows<W: Write>(writer: W, rows: &[EvaluationRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer
        .write_record(EvaluationRow::COLUMNS)
        .map_err(|e| Error::csv(e.to_string()))?;
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| Error::csv(e.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<EvaluationRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::csv(e.to_string()))?;
    if headers.iter().ne(EvaluationRow::COLUMNS) {
        return Err(Error::csv(format!(
            "unexpected results header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    csv_reader
        .deserialize::<EvaluationRow>()
        .map(|row| row.map_err(|e| Error::csv(e.to_string())))
        .collect()
}

/// Write the accumulated rows to `dir` under a file name stamped with `timestamp`.
///
/// An existing results file with the same name is never replaced.
pub fn write_results_at(
    accumulator: &EvaluationAccumulator,
    dir: &Path,
    timestamp: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(results_file_name(timestamp));
    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::invalid_input(format!(
                "Results file {} already exists",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    write_rows(file, accumulator.rows())?;

    info!(
        "Wrote {} evaluation rows to {}",
        accumulator.len(),
        path.display()
    );
    Ok(path)
}

pub fn write_results(accumulator: &EvaluationAccumulator, dir: &Path) -> Result<PathBuf> {
    write_results_at(accumulator, dir, Utc::now())
}

pub fn read_results(path: &Path) -> Result<Vec<EvaluationRow>> {
    if !path.exists() {
        return Err(Error::not_found(format!(
            "Results file not found at {}",
            path.display()
        )));
    }
    read_rows(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use review_eval_core::{Judgment, Verdict};

    fn row(variant: &str, old_comment: Option<&str>) -> EvaluationRow {
        EvaluationRow {
            variant_name: variant.to_string(),
            revision_id: "100".to_string(),
            diff_id: "200".to_string(),
            new_comment: "Check the \"result\", please".to_string(),
            old_comments_count: 1,
            matched: old_comment.is_some(),
            old_comment: old_comment.map(str::to_string),
            evaluation: if old_comment.is_some() {
                Verdict::Correct
            } else {
                Verdict::Unmatched
            },
        }
    }

    #[test]
    fn test_file_name_round_trips_timestamp() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 1).unwrap();
        let name = results_file_name(timestamp);
        assert_eq!(name, "evaluation_results_2024-03-09T17-05-01.csv");
        assert_eq!(
            parse_results_file_name(&name),
            Some(timestamp.naive_utc())
        );
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert_eq!(parse_results_file_name("evaluation_results_latest.csv"), None);
        assert_eq!(parse_results_file_name("notes.csv"), None);
        assert_eq!(
            parse_results_file_name("evaluation_results_2024-03-09T17-05-01.json"),
            None
        );
    }

    #[test]
    fn test_empty_output_has_header_only() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "variant_name,revision_id,diff_id,new_comment,old_comments_count,matched,old_comment,evaluation\n"
        );
    }

    #[test]
    fn test_rows_read_back() {
        let rows = vec![row("Current Filtering", Some("Null check")), row("New Filtering", None)];
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &rows).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.contains("Current Filtering,100,200"));
        assert!(text.contains(",correct\n"));

        assert_eq!(read_rows(buffer.as_slice()).unwrap(), rows);
    }

    #[test]
    fn test_results_file_from_the_same_second_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 1).unwrap();

        let mut first = EvaluationAccumulator::new();
        first.extend(vec![row("Current Filtering", Some("Null check"))]);
        let path = write_results_at(&first, dir.path(), timestamp).unwrap();

        let err = write_results_at(&EvaluationAccumulator::new(), dir.path(), timestamp)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(read_results(&path).unwrap(), first.rows());
    }

    #[test]
    fn test_empty_old_comment_reads_back_unchanged() {
        let judgment = Judgment {
            new_comment: "Leak on early return".to_string(),
            old_comments_count: 1,
            matched: true,
            old_comment: Some(String::new()),
            evaluation: Verdict::Incorrect,
        };
        let rows = vec![EvaluationRow::from_judgment("New Filtering", "100", "200", judgment)];
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &rows).unwrap();
        assert_eq!(read_rows(buffer.as_slice()).unwrap(), rows);
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let err = read_rows("a,b\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_variant_names_in_first_appearance_order() {
        let mut accumulator = EvaluationAccumulator::new();
        accumulator.extend(vec![
            row("New Filtering", None),
            row("Current Filtering", None),
            row("New Filtering", None),
        ]);
        assert_eq!(
            accumulator.variant_names(),
            vec!["New Filtering", "Current Filtering"]
        );
    }
}
