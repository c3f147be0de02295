//! The labeled ground-truth dataset of past review comments
//!
//! One CSV row per human-labeled comment:
//!
//! ```text
//! revision_id,diff_id,comment_id,file_path,line,comment,evaluation
//! 1001,2001,c1,dom/base/Element.cpp,42,"Missing null check",correct
//! ```
//!
//! `comment_id` and `line` may be empty or absent. `evaluation` accepts the
//! labels understood by [`Verdict::from_label`].

use crate::error::AdapterError;
use review_eval_core::models::normalize_patch_path;
use review_eval_core::{Error, Result, ReviewRequest, Verdict};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// One labeled comment from the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledComment {
    pub revision_id: String,
    pub diff_id: String,
    pub comment_id: Option<String>,
    pub file_path: String,
    pub line: Option<u32>,
    pub comment: String,
    pub evaluation: Verdict,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
    revision_id: String,
    diff_id: String,
    #[serde(default)]
    comment_id: Option<String>,
    file_path: String,
    #[serde(default)]
    line: Option<u32>,
    comment: String,
    evaluation: String,
}

/// In-memory view of the labeled dataset
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    comments: Vec<LabeledComment>,
}

impl LabeledDataset {
    /// Load the dataset from a CSV file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(format!(
                "Labeled dataset not found at {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        info!(
            "Loaded {} labeled comments from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut comments = Vec::new();
        for (index, record) in csv_reader.deserialize::<DatasetRecord>().enumerate() {
            let record_number = index as u64 + 1;
            let record = record.map_err(|e| AdapterError::Dataset {
                record: record_number,
                message: e.to_string(),
            })?;
            let evaluation =
                Verdict::from_label(&record.evaluation).ok_or_else(|| AdapterError::Dataset {
                    record: record_number,
                    message: format!("unknown evaluation label '{}'", record.evaluation),
                })?;
            comments.push(LabeledComment {
                revision_id: record.revision_id,
                diff_id: record.diff_id,
                comment_id: record.comment_id.filter(|id| !id.is_empty()),
                file_path: record.file_path,
                line: record.line,
                comment: record.comment,
                evaluation,
            });
        }

        Ok(Self { comments })
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn comments(&self) -> &[LabeledComment] {
        &self.comments
    }

    /// Distinct review requests in first-occurrence order
    pub fn review_requests(&self) -> Vec<ReviewRequest> {
        let mut seen = HashSet::new();
        self.comments
            .iter()
            .filter(|c| seen.insert((c.revision_id.as_str(), c.diff_id.as_str())))
            .map(|c| ReviewRequest::new(c.revision_id.clone(), c.diff_id.clone()))
            .collect()
    }

    pub fn comments_for_diff<'a>(
        &'a self,
        diff_id: &'a str,
    ) -> impl Iterator<Item = &'a LabeledComment> + 'a {
        self.comments.iter().filter(move |c| c.diff_id == diff_id)
    }

    /// Labeled comments left on `file` in the given diff
    pub fn comments_for_file<'a>(
        &'a self,
        diff_id: &'a str,
        file: &'a str,
    ) -> impl Iterator<Item = &'a LabeledComment> + 'a {
        let wanted = normalize_patch_path(file);
        self.comments_for_diff(diff_id)
            .filter(move |c| normalize_patch_path(&c.file_path) == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
revision_id,diff_id,comment_id,file_path,line,comment,evaluation
1001,2001,c1,dom/base/Element.cpp,42,Missing null check,correct
1001,2001,c2,dom/base/Element.cpp,,\"Rename this, please\",INCORRECT
1002,2002,,layout/Frame.cpp,7,Leaks the frame,correct
1001,2001,c3,b/dom/base/Node.cpp,3,Typo,incorrect
";

    #[test]
    fn test_parse_sample() {
        let dataset = LabeledDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 4);

        let first = &dataset.comments()[0];
        assert_eq!(first.line, Some(42));
        assert_eq!(first.evaluation, Verdict::Correct);

        let second = &dataset.comments()[1];
        assert_eq!(second.line, None);
        assert_eq!(second.comment, "Rename this, please");
        assert_eq!(second.evaluation, Verdict::Incorrect);

        assert_eq!(dataset.comments()[2].comment_id, None);
    }

    #[test]
    fn test_review_requests_are_deduplicated_in_order() {
        let dataset = LabeledDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            dataset.review_requests(),
            vec![
                ReviewRequest::new("1001", "2001"),
                ReviewRequest::new("1002", "2002"),
            ]
        );
    }

    #[test]
    fn test_comments_for_file_ignores_diff_prefix() {
        let dataset = LabeledDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.comments_for_diff("2001").count(), 3);
        assert_eq!(
            dataset.comments_for_file("2001", "dom/base/Element.cpp").count(),
            2
        );
        assert_eq!(dataset.comments_for_file("2001", "a/dom/base/Node.cpp").count(), 1);
        assert_eq!(dataset.comments_for_file("2002", "dom/base/Node.cpp").count(), 0);
    }

    #[test]
    fn test_unknown_label_reports_record() {
        let input = "\
revision_id,diff_id,file_path,comment,evaluation
1,2,a.cpp,Hmm,maybe
";
        let err = LabeledDataset::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabeledDataset::load(&dir.path().join("labels.csv")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
