//! Candidate generation for a single review request
//!
//! Fetches the patch, asks the generation tool for raw suggestions and
//! resolves the rejected-examples context shared by every variant. Skip
//! conditions are reported as [`GenerationOutcome::Skipped`]; every other
//! error propagates.

use review_eval_core::{
    CandidateComment, Patch, PatchStore, Result, ReviewRequest, SimilarityStore, SkipReason,
    SuggestionGenerator,
};
use review_eval_llm::response::extract_json_array;
use std::sync::Arc;
use tracing::{debug, warn};

/// Generation output for one request, before any filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub patch: Patch,
    pub raw_output: String,
    pub rejected_examples: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(Candidates),
    Skipped(SkipReason),
}

pub struct CandidateGenerator {
    patch_store: Arc<dyn PatchStore>,
    suggestion_generator: Arc<dyn SuggestionGenerator>,
    similarity_store: Option<Arc<dyn SimilarityStore>>,
    default_rejected_examples: String,
}

impl CandidateGenerator {
    pub fn new(
        patch_store: Arc<dyn PatchStore>,
        suggestion_generator: Arc<dyn SuggestionGenerator>,
        similarity_store: Option<Arc<dyn SimilarityStore>>,
        default_rejected_examples: impl Into<String>,
    ) -> Self {
        Self {
            patch_store,
            suggestion_generator,
            similarity_store,
            default_rejected_examples: default_rejected_examples.into(),
        }
    }

    pub async fn generate(&self, request: &ReviewRequest) -> Result<GenerationOutcome> {
        let patch = self.patch_store.get_patch_by_id(&request.patch_id).await?;

        let raw_output = match self.suggestion_generator.generate(&patch).await {
            Ok(output) => output,
            Err(e) => {
                let Some(reason) = e.skip_reason() else {
                    return Err(e);
                };
                warn!(
                    "Skipping revision {} (diff {}): {e}",
                    request.revision_id, request.patch_id
                );
                return Ok(GenerationOutcome::Skipped(reason));
            }
        };

        let candidates = candidate_texts(&raw_output);
        if candidates.is_empty() {
            warn!(
                "Skipping revision {} (diff {}): no suggestions generated",
                request.revision_id, request.patch_id
            );
            return Ok(GenerationOutcome::Skipped(SkipReason::NoSuggestions));
        }
        debug!(
            "Diff {} produced {} candidate comments",
            request.patch_id,
            candidates.len()
        );

        let rejected_examples = self.rejected_examples(&candidates).await?;

        Ok(GenerationOutcome::Generated(Candidates {
            patch,
            raw_output,
            rejected_examples,
        }))
    }

    async fn rejected_examples(&self, candidates: &[String]) -> Result<String> {
        match &self.similarity_store {
            Some(store) => {
                let similar = store.get_similar_rejected_comments(candidates).await?;
                Ok(similar.join("\n"))
            }
            None => Ok(self.default_rejected_examples.clone()),
        }
    }
}

/// Comment texts of raw generation output.
///
/// Structured output (a JSON list of comment objects or strings) is read as
/// such; anything else is taken one non-blank line per candidate.
pub fn candidate_texts(raw_output: &str) -> Vec<String> {
    if let Some(json) = extract_json_array(raw_output) {
        if let Ok(comments) = serde_json::from_str::<Vec<CandidateComment>>(json) {
            return comments
                .into_iter()
                .map(|c| c.comment.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Ok(texts) = serde_json::from_str::<Vec<String>>(json) {
            return texts
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
    }

    raw_output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_candidate_texts_from_comment_objects() {
        let raw = r#"Summary of the change.
[{"file": "a.cpp", "code_line": 3, "comment": "Leak on early return"},
 {"file": "a.cpp", "code_line": 9, "comment": "  "}]"#;
        assert_eq!(candidate_texts(raw), vec!["Leak on early return"]);
    }

    #[test]
    fn test_candidate_texts_from_strings() {
        assert_eq!(
            candidate_texts(r#"["First", "Second"]"#),
            vec!["First", "Second"]
        );
    }

    #[test]
    fn test_candidate_texts_fall_back_to_lines() {
        assert_eq!(
            candidate_texts("Check bounds\n\n  Free the buffer  \n"),
            vec!["Check bounds", "Free the buffer"]
        );
    }

    #[test]
    fn test_empty_outputs_have_no_candidates() {
        assert!(candidate_texts("").is_empty());
        assert!(candidate_texts("   \n").is_empty());
        assert!(candidate_texts("```json\n[]\n```").is_empty());
    }
}
