//! Scoring filtered comments and attaching variant metadata

use review_eval_core::{
    CheckpointRecord, Comment, EvaluationRow, GroundTruthEvaluator, Judgment, Result,
    VariantEvaluation,
};
use std::sync::Arc;

pub struct EvaluatorAdapter {
    evaluator: Arc<dyn GroundTruthEvaluator>,
}

impl EvaluatorAdapter {
    pub fn new(evaluator: Arc<dyn GroundTruthEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Judge `comments` against the ground truth of `patch_id`
    pub async fn judge(&self, patch_id: &str, comments: &[Comment]) -> Result<Vec<Judgment>> {
        if comments.is_empty() {
            return Ok(Vec::new());
        }
        self.evaluator
            .evaluate_diff_comments(patch_id, comments)
            .await
    }

    pub async fn evaluate(
        &self,
        variant_name: &str,
        record: &CheckpointRecord,
        comments: &[Comment],
    ) -> Result<Vec<EvaluationRow>> {
        let judgments = self.judge(record.diff_id(), comments).await?;
        Ok(to_rows(variant_name, record, judgments))
    }
}

/// Inject variant, revision and diff identifiers into each judgment
pub fn to_rows(
    variant_name: &str,
    record: &CheckpointRecord,
    judgments: Vec<Judgment>,
) -> Vec<EvaluationRow> {
    judgments
        .into_iter()
        .map(|j| EvaluationRow::from_judgment(variant_name, &record.revision_id, record.diff_id(), j))
        .collect()
}

/// Rows for an evaluation stored in the checkpoint
pub fn stored_rows(evaluation: &VariantEvaluation, record: &CheckpointRecord) -> Vec<EvaluationRow> {
    to_rows(&evaluation.variant_name, record, evaluation.judgments.clone())
}
