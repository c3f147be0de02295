//! Data model shared by every stage of the evaluation pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single code change selected for evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Review identifier, stable across runs
    pub revision_id: String,
    /// Identifier used to fetch the concrete diff
    pub patch_id: String,
}

impl ReviewRequest {
    pub fn new(revision_id: impl Into<String>, patch_id: impl Into<String>) -> Self {
        Self {
            revision_id: revision_id.into(),
            patch_id: patch_id.into(),
        }
    }
}

/// One file touched by a patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFile {
    pub path: String,
    #[serde(default)]
    pub added_lines: Vec<u32>,
    #[serde(default)]
    pub removed_lines: Vec<u32>,
}

/// Retrieved diff content for a patch identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub patch_id: String,
    /// Raw unified diff text
    pub raw_diff: String,
    /// File-scoped view used to validate comment anchors
    pub files: Vec<PatchFile>,
}

impl Patch {
    /// Returns the patch entry for `path`, ignoring `a/` and `b/` diff prefixes
    pub fn file(&self, path: &str) -> Option<&PatchFile> {
        let wanted = normalize_patch_path(path);
        self.files
            .iter()
            .find(|f| normalize_patch_path(&f.path) == wanted)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.file(path).is_some()
    }

    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    /// Size of the raw diff in bytes
    pub fn size(&self) -> usize {
        self.raw_diff.len()
    }
}

/// Strips the `a/` or `b/` prefix unified diffs put in front of paths
pub fn normalize_patch_path(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

/// A filtered review comment anchored to a location in the patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub file: String,
    pub line: u32,
    pub content: String,
}

/// A review comment as emitted by a model, before validation against the patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateComment {
    pub file: String,
    #[serde(
        default,
        alias = "line",
        deserialize_with = "deserialize_lenient_line"
    )]
    pub code_line: Option<u32>,
    #[serde(alias = "content")]
    pub comment: String,
}

/// Accepts `12`, `"12"` or `null` for a line anchor
fn deserialize_lenient_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid line number {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid line number '{s}'"))),
        other => Err(D::Error::custom(format!("invalid line number {other}"))),
    }
}

/// Categorical outcome of comparing a generated comment with ground truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Matched a ground-truth comment that reviewers accepted
    Correct,
    /// Matched a ground-truth comment that reviewers rejected
    Incorrect,
    /// No ground-truth comment to compare against
    Unmatched,
}

impl Verdict {
    /// Parses a ground-truth label such as `CORRECT` or `incorrect`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "correct" | "accepted" | "valid" => Some(Self::Correct),
            "incorrect" | "rejected" | "invalid" => Some(Self::Incorrect),
            "unmatched" => Some(Self::Unmatched),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A judgment returned by the ground-truth evaluator, before variant metadata
/// is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub new_comment: String,
    pub old_comments_count: usize,
    pub matched: bool,
    pub old_comment: Option<String>,
    pub evaluation: Verdict,
}

/// One scored row of the final results table.
///
/// Field order is the column order of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub variant_name: String,
    pub revision_id: String,
    pub diff_id: String,
    pub new_comment: String,
    pub old_comments_count: usize,
    pub matched: bool,
    /// Never `Some("")`: an empty CSV field reads back as `None`
    pub old_comment: Option<String>,
    pub evaluation: Verdict,
}

impl EvaluationRow {
    /// Column names of the results table, in order
    pub const COLUMNS: [&'static str; 8] = [
        "variant_name",
        "revision_id",
        "diff_id",
        "new_comment",
        "old_comments_count",
        "matched",
        "old_comment",
        "evaluation",
    ];

    pub fn from_judgment(
        variant_name: &str,
        revision_id: &str,
        diff_id: &str,
        judgment: Judgment,
    ) -> Self {
        Self {
            variant_name: variant_name.to_string(),
            revision_id: revision_id.to_string(),
            diff_id: diff_id.to_string(),
            new_comment: judgment.new_comment,
            old_comments_count: judgment.old_comments_count,
            matched: judgment.matched,
            old_comment: judgment.old_comment.filter(|c| !c.is_empty()),
            evaluation: judgment.evaluation,
        }
    }
}

/// Judgments produced for one variant of one review request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEvaluation {
    pub variant_name: String,
    pub judgments: Vec<Judgment>,
}

/// Post-generation state of one review request; the unit of resumability.
///
/// Created once by the generation pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Rejected comments similar to the candidates, shared by every variant
    pub rejected_examples: String,
    /// Unprocessed generation output
    pub raw_output: String,
    pub patch: Patch,
    pub revision_id: String,
    pub review_request: ReviewRequest,
    /// Evaluation of the first configured variant, absent if it was skipped
    pub evaluation_for_original: Option<VariantEvaluation>,
}

impl CheckpointRecord {
    pub fn diff_id(&self) -> &str {
        &self.review_request.patch_id
    }
}
