//! Filtering strategies: prompt templates that decide which candidates survive

use review_eval_core::config::VariantConfig;
use review_eval_core::{
    CandidateComment, CheckpointRecord, Comment, Error, LanguageModel, Patch, Result,
};
use review_eval_llm::format_prompt;
use review_eval_llm::response::extract_json_array;
use std::fs;
use tracing::debug;

pub const CURRENT_TEMPLATE: &str = include_str!("../assets/prompts/current.txt");
pub const NEW_TEMPLATE: &str = include_str!("../assets/prompts/new.txt");

/// Everything a strategy sees for one review request.
///
/// Built once per request and shared by every variant.
#[derive(Debug, Clone, Copy)]
pub struct FilterInput<'a> {
    pub raw_output: &'a str,
    pub patch: &'a Patch,
    pub rejected_examples: &'a str,
}

impl<'a> FilterInput<'a> {
    pub fn from_record(record: &'a CheckpointRecord) -> Self {
        Self {
            raw_output: &record.raw_output,
            patch: &record.patch,
            rejected_examples: &record.rejected_examples,
        }
    }
}

/// One named filtering variant
#[derive(Debug, Clone)]
pub struct FilteringStrategy {
    name: String,
    template: String,
    target_software: String,
}

impl FilteringStrategy {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        target_software: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            target_software: target_software.into(),
        }
    }

    /// Build a strategy from its configuration, reading a custom template file
    /// when one is set
    pub fn from_config(variant: &VariantConfig, target_software: &str) -> Result<Self> {
        let template = match &variant.template_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::not_found(format!(
                        "Template for variant '{}' not found at {}",
                        variant.name,
                        path.display()
                    )));
                }
                fs::read_to_string(path)?
            }
            None => builtin_template(&variant.template)
                .ok_or_else(|| {
                    Error::config(format!(
                        "Unknown template '{}' for variant '{}'",
                        variant.template, variant.name
                    ))
                })?
                .to_string(),
        };
        Ok(Self::new(variant.name.clone(), template, target_software))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, input: &FilterInput<'_>) -> String {
        format_prompt(
            &self.template,
            &[
                ("target_software", self.target_software.as_str()),
                ("comments", input.raw_output),
                ("patch", input.patch.raw_diff.as_str()),
                ("rejected_examples", input.rejected_examples),
            ],
        )
    }

    /// Run the filtering prompt and return the model's unprocessed answer
    pub async fn filter(
        &self,
        model: &dyn LanguageModel,
        input: &FilterInput<'_>,
    ) -> Result<String> {
        let prompt = self.render(input);
        debug!(
            "Variant '{}' prompt: {} chars for patch {}",
            self.name,
            prompt.len(),
            input.patch.patch_id
        );
        model.generate(&prompt).await
    }
}

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "current" => Some(CURRENT_TEMPLATE),
        "new" => Some(NEW_TEMPLATE),
        _ => None,
    }
}

/// Parse filtered model output into comments anchored in `patch`.
///
/// Fails with `ParseFailure` when there is no JSON list or a comment lacks a
/// positive line, and with `FileNotInPatch` when a comment names a file the
/// patch does not touch.
pub fn parse_filtered_comments(text: &str, patch: &Patch) -> Result<Vec<Comment>> {
    let json = extract_json_array(text)
        .ok_or_else(|| Error::parse_failure("filtered output contains no JSON list"))?;
    let candidates: Vec<CandidateComment> = serde_json::from_str(json)
        .map_err(|e| Error::parse_failure(format!("malformed comment list: {e}")))?;

    candidates
        .into_iter()
        .map(|candidate| {
            if !patch.contains_file(&candidate.file) {
                return Err(Error::file_not_in_patch(candidate.file));
            }
            match candidate.code_line {
                Some(line) if line > 0 => Ok(Comment {
                    file: candidate.file,
                    line,
                    content: candidate.comment,
                }),
                _ => Err(Error::parse_failure(format!(
                    "comment on {} has no line anchor",
                    candidate.file
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review_eval_core::PatchFile;

    fn patch() -> Patch {
        Patch {
            patch_id: "200".to_string(),
            raw_diff: "--- a/gfx/Layer.cpp\n+++ b/gfx/Layer.cpp\n+  mSize = 0;\n".to_string(),
            files: vec![PatchFile {
                path: "gfx/Layer.cpp".to_string(),
                added_lines: vec![12],
                removed_lines: vec![],
            }],
        }
    }

    #[test]
    #[allow(clippy::len_zero)]
    fn test_builtin_templates_load() {
        for template in [CURRENT_TEMPLATE, NEW_TEMPLATE] {
            assert!(template.len() > 0);
            for placeholder in [
                "{target_software}",
                "{comments}",
                "{patch}",
                "{rejected_examples}",
            ] {
                assert!(template.contains(placeholder), "missing {placeholder}");
            }
        }
    }

    #[test]
    fn test_render_binds_every_placeholder() {
        let patch = patch();
        let input = FilterInput {
            raw_output: "[{\"file\": \"gfx/Layer.cpp\"}]",
            patch: &patch,
            rejected_examples: "Nice cleanup!",
        };
        let strategy = FilteringStrategy::new(
            "Custom",
            "{target_software}|{comments}|{patch}|{rejected_examples}",
            "Firefox",
        );
        assert_eq!(
            strategy.render(&input),
            format!(
                "Firefox|[{{\"file\": \"gfx/Layer.cpp\"}}]|{}|Nice cleanup!",
                patch.raw_diff
            )
        );
    }

    #[test]
    fn test_render_keeps_placeholders_found_in_candidates() {
        let patch = Patch {
            raw_diff: "+ DIFF BODY".to_string(),
            ..patch()
        };
        let input = FilterInput {
            raw_output: "Use {patch} in the template, not {rejected_examples}",
            patch: &patch,
            rejected_examples: "Nit.",
        };
        let strategy = FilteringStrategy::new("Custom", "C=<{comments}> P=<{patch}>", "Firefox");
        assert_eq!(
            strategy.render(&input),
            "C=<Use {patch} in the template, not {rejected_examples}> P=<+ DIFF BODY>"
        );
    }

    #[test]
    fn test_from_config_resolves_builtin_and_rejects_unknown() {
        let variant = VariantConfig {
            name: "New Filtering".to_string(),
            template: "new".to_string(),
            template_path: None,
        };
        let strategy = FilteringStrategy::from_config(&variant, "Firefox").unwrap();
        assert_eq!(strategy.name(), "New Filtering");

        let unknown = VariantConfig {
            template: "bespoke".to_string(),
            ..variant
        };
        assert!(matches!(
            FilteringStrategy::from_config(&unknown, "Firefox"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_config_reads_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strict.txt");
        fs::write(&path, "Only bugs: {comments}").unwrap();

        let variant = VariantConfig {
            name: "Strict".to_string(),
            template: String::new(),
            template_path: Some(path),
        };
        let strategy = FilteringStrategy::from_config(&variant, "Firefox").unwrap();
        let patch = patch();
        let input = FilterInput {
            raw_output: "a",
            patch: &patch,
            rejected_examples: "",
        };
        assert_eq!(strategy.render(&input), "Only bugs: a");
    }

    #[test]
    fn test_parse_fenced_list() {
        let text = "```json\n[{\"file\": \"b/gfx/Layer.cpp\", \"code_line\": 12, \"comment\": \"Reset mCount too\"}]\n```";
        assert_eq!(
            parse_filtered_comments(text, &patch()).unwrap(),
            vec![Comment {
                file: "b/gfx/Layer.cpp".to_string(),
                line: 12,
                content: "Reset mCount too".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_filtered_comments("[]", &patch()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_failures_are_classified() {
        let patch = patch();
        assert!(matches!(
            parse_filtered_comments("I would keep all of them.", &patch),
            Err(Error::ParseFailure(_))
        ));
        assert!(matches!(
            parse_filtered_comments(
                r#"[{"file": "gfx/Layer.cpp", "code_line": 0, "comment": "x"}]"#,
                &patch
            ),
            Err(Error::ParseFailure(_))
        ));
        assert!(matches!(
            parse_filtered_comments(
                r#"[{"file": "dom/Other.cpp", "code_line": 4, "comment": "x"}]"#,
                &patch
            ),
            Err(Error::FileNotInPatch { .. })
        ));
    }
}
