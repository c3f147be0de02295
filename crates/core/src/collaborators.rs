//! Interfaces of the external collaborators consumed by the pipeline
//!
//! Concrete implementations live in the `review-eval-adapters` and
//! `review-eval-llm` crates; tests provide in-memory ones.

use crate::error::Result;
use crate::models::{Comment, Judgment, Patch};
use async_trait::async_trait;

/// Source of diff content for patch identifiers
#[async_trait]
pub trait PatchStore: Send + Sync {
    async fn get_patch_by_id(&self, patch_id: &str) -> Result<Patch>;
}

/// The review-comment generation tool
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Produce raw candidate comments for a patch.
    ///
    /// Returns `Error::FileNotInPatch` when the analysis cannot be anchored to
    /// the patch and `Error::LargeDiff` when the patch is too big to process.
    async fn generate(&self, patch: &Patch) -> Result<String>;
}

/// Lookup of previously rejected comments similar to a set of candidates
#[async_trait]
pub trait SimilarityStore: Send + Sync {
    async fn get_similar_rejected_comments(&self, candidates: &[String]) -> Result<Vec<String>>;
}

/// Text generation backend used to render filtering prompts
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Compares generated comments with the labeled ground truth of a diff
#[async_trait]
pub trait GroundTruthEvaluator: Send + Sync {
    async fn evaluate_diff_comments(
        &self,
        patch_id: &str,
        comments: &[Comment],
    ) -> Result<Vec<Judgment>>;
}
