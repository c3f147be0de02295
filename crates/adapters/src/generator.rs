//! Review comment generation backed by a language model

use crate::prompts;
use async_trait::async_trait;
use review_eval_core::config::GenerationConfig;
use review_eval_core::{CandidateComment, Error, LanguageModel, Patch, Result, SuggestionGenerator};
use review_eval_llm::format_prompt;
use review_eval_llm::response::extract_json_array;
use std::sync::Arc;
use tracing::{debug, info};

/// Generates raw review suggestions by prompting a language model with the diff
pub struct LlmSuggestionGenerator {
    model: Arc<dyn LanguageModel>,
    target_software: String,
    max_diff_bytes: usize,
}

impl LlmSuggestionGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, config: &GenerationConfig) -> Self {
        info!(
            "Suggestion generator using {} (diff limit {} bytes)",
            model.model_name(),
            config.max_diff_bytes
        );
        Self {
            model,
            target_software: config.target_software.clone(),
            max_diff_bytes: config.max_diff_bytes,
        }
    }
}

/// Fail with `FileNotInPatch` if structured output names a file outside the patch.
///
/// Output that is not a JSON list is returned to the caller unchecked.
fn check_anchors(output: &str, patch: &Patch) -> Result<()> {
    let Some(json) = extract_json_array(output) else {
        return Ok(());
    };
    let Ok(candidates) = serde_json::from_str::<Vec<CandidateComment>>(json) else {
        return Ok(());
    };

    match candidates.iter().find(|c| !patch.contains_file(&c.file)) {
        Some(stray) => Err(Error::file_not_in_patch(stray.file.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl SuggestionGenerator for LlmSuggestionGenerator {
    async fn generate(&self, patch: &Patch) -> Result<String> {
        let size = patch.size();
        if size > self.max_diff_bytes {
            return Err(Error::LargeDiff {
                patch_id: patch.patch_id.clone(),
                size,
                limit: self.max_diff_bytes,
            });
        }

        let prompt = format_prompt(
            prompts::GENERATION,
            &[
                ("target_software", self.target_software.as_str()),
                ("patch", patch.raw_diff.as_str()),
            ],
        );
        let output = self.model.generate(&prompt).await?;
        debug!(
            "Generation for patch {} returned {} chars",
            patch.patch_id,
            output.len()
        );

        check_anchors(&output, patch)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_eval_core::PatchFile;
    use std::sync::Mutex;

    struct CannedModel {
        response: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: response.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn patch(raw_diff: &str) -> Patch {
        Patch {
            patch_id: "7".to_string(),
            raw_diff: raw_diff.to_string(),
            files: vec![PatchFile {
                path: "dom/base/Element.cpp".to_string(),
                added_lines: vec![10],
                removed_lines: vec![],
            }],
        }
    }

    fn config(max_diff_bytes: usize) -> GenerationConfig {
        GenerationConfig {
            target_software: "Mozilla Firefox".to_string(),
            max_diff_bytes,
        }
    }

    #[tokio::test]
    async fn test_large_diff_skips_the_model() {
        let model = CannedModel::new("[]");
        let generator = LlmSuggestionGenerator::new(model.clone(), &config(4));

        let err = generator.generate(&patch("+ too long")).await.unwrap_err();
        assert!(matches!(err, Error::LargeDiff { limit: 4, .. }));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_includes_target_and_diff() {
        let model = CannedModel::new(
            r#"[{"file": "dom/base/Element.cpp", "code_line": 10, "comment": "Null check"}]"#,
        );
        let generator = LlmSuggestionGenerator::new(model.clone(), &config(1000));

        let output = generator.generate(&patch("+ if (x) {")).await.unwrap();
        assert!(output.contains("Null check"));

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Mozilla Firefox"));
        assert!(prompts[0].contains("+ if (x) {"));
    }

    #[tokio::test]
    async fn test_comment_on_foreign_file_is_file_not_in_patch() {
        let model = CannedModel::new(
            r#"[{"file": "layout/Frame.cpp", "code_line": 3, "comment": "Leak"}]"#,
        );
        let generator = LlmSuggestionGenerator::new(model, &config(1000));

        let err = generator.generate(&patch("+ x")).await.unwrap_err();
        assert!(matches!(err, Error::FileNotInPatch { ref file } if file == "layout/Frame.cpp"));
    }

    #[test]
    fn test_unstructured_output_passes_through() {
        assert!(check_anchors("Looks fine to me.", &patch("+ x")).is_ok());
    }
}
