//! Ground-truth evaluation against the labeled dataset
//!
//! Each new comment is compared with the labeled comments that reviewers left
//! on the same file of the same diff. A language model decides whether one of
//! them makes the same point; the matched comment's label becomes the verdict.

use crate::dataset::{LabeledComment, LabeledDataset};
use crate::prompts;
use async_trait::async_trait;
use review_eval_core::{
    Comment, Error, GroundTruthEvaluator, Judgment, LanguageModel, Result, Verdict,
};
use review_eval_llm::format_prompt;
use review_eval_llm::response::extract_json;
use std::sync::Arc;
use tracing::debug;

pub struct LabeledDatasetEvaluator {
    dataset: Arc<LabeledDataset>,
    model: Arc<dyn LanguageModel>,
}

impl LabeledDatasetEvaluator {
    pub fn new(dataset: Arc<LabeledDataset>, model: Arc<dyn LanguageModel>) -> Self {
        Self { dataset, model }
    }

    async fn judge(&self, comment: &Comment, old_comments: &[&LabeledComment]) -> Result<Judgment> {
        if old_comments.is_empty() {
            return Ok(Judgment {
                new_comment: comment.content.clone(),
                old_comments_count: 0,
                matched: false,
                old_comment: None,
                evaluation: Verdict::Unmatched,
            });
        }

        let numbered = number_comments(old_comments);
        let prompt = format_prompt(
            prompts::JUDGE,
            &[
                ("old_comments", numbered.as_str()),
                ("new_comment", comment.content.as_str()),
            ],
        );
        let response = self.model.generate(&prompt).await?;

        let judgment = match parse_match(&response, old_comments.len())? {
            Some(index) => {
                let old = old_comments[index];
                Judgment {
                    new_comment: comment.content.clone(),
                    old_comments_count: old_comments.len(),
                    matched: true,
                    old_comment: Some(old.comment.clone()),
                    evaluation: old.evaluation,
                }
            }
            None => Judgment {
                new_comment: comment.content.clone(),
                old_comments_count: old_comments.len(),
                matched: false,
                old_comment: None,
                evaluation: Verdict::Unmatched,
            },
        };
        Ok(judgment)
    }
}

fn number_comments(comments: &[&LabeledComment]) -> String {
    comments
        .iter()
        .enumerate()
        .map(|(i, c)| match c.line {
            Some(line) => format!("{}. (line {line}) {}", i + 1, c.comment),
            None => format!("{}. {}", i + 1, c.comment),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse `{"match": N}` (1-based) into a zero-based index
fn parse_match(response: &str, candidates: usize) -> Result<Option<usize>> {
    let json = extract_json(response)
        .ok_or_else(|| Error::parse_failure("judge response contains no JSON object"))?;
    let value: serde_json::Value = serde_json::from_str(json)?;

    match value.get("match") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => {
            let number = n
                .as_u64()
                .ok_or_else(|| Error::parse_failure(format!("invalid match index {n}")))?;
            let index = usize::try_from(number).unwrap_or(usize::MAX);
            if index == 0 || index > candidates {
                return Err(Error::parse_failure(format!(
                    "match index {index} outside 1..={candidates}"
                )));
            }
            Ok(Some(index - 1))
        }
        Some(other) => Err(Error::parse_failure(format!("unexpected match value {other}"))),
    }
}

#[async_trait]
impl GroundTruthEvaluator for LabeledDatasetEvaluator {
    async fn evaluate_diff_comments(
        &self,
        patch_id: &str,
        comments: &[Comment],
    ) -> Result<Vec<Judgment>> {
        let mut judgments = Vec::with_capacity(comments.len());
        for comment in comments {
            let old_comments: Vec<&LabeledComment> = self
                .dataset
                .comments_for_file(patch_id, &comment.file)
                .collect();
            judgments.push(self.judge(comment, &old_comments).await?);
        }
        debug!("Judged {} comments for diff {patch_id}", judgments.len());
        Ok(judgments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LABELS: &str = "\
revision_id,diff_id,file_path,line,comment,evaluation
1001,2001,dom/base/Element.cpp,42,Missing null check,correct
1001,2001,dom/base/Element.cpp,50,Use a smart pointer,incorrect
";

    struct FixedModel(&'static str);

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn evaluator(response: &'static str) -> LabeledDatasetEvaluator {
        let dataset = LabeledDataset::from_reader(LABELS.as_bytes()).unwrap();
        LabeledDatasetEvaluator::new(Arc::new(dataset), Arc::new(FixedModel(response)))
    }

    fn comment(file: &str, content: &str) -> Comment {
        Comment {
            file: file.to_string(),
            line: 42,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_match_takes_label_of_old_comment() {
        let judgments = evaluator(r#"{"match": 2}"#)
            .evaluate_diff_comments("2001", &[comment("dom/base/Element.cpp", "Prefer RefPtr")])
            .await
            .unwrap();
        assert_eq!(
            judgments,
            vec![Judgment {
                new_comment: "Prefer RefPtr".to_string(),
                old_comments_count: 2,
                matched: true,
                old_comment: Some("Use a smart pointer".to_string()),
                evaluation: Verdict::Incorrect,
            }]
        );
    }

    #[tokio::test]
    async fn test_no_old_comments_is_unmatched() {
        let judgments = evaluator("not consulted")
            .evaluate_diff_comments("2001", &[comment("layout/Frame.cpp", "Leak")])
            .await
            .unwrap();
        assert_eq!(judgments[0].evaluation, Verdict::Unmatched);
        assert_eq!(judgments[0].old_comments_count, 0);
    }

    #[tokio::test]
    async fn test_null_match_is_unmatched() {
        let judgments = evaluator("```json\n{\"match\": null}\n```")
            .evaluate_diff_comments("2001", &[comment("dom/base/Element.cpp", "Typo")])
            .await
            .unwrap();
        assert!(!judgments[0].matched);
        assert_eq!(judgments[0].old_comments_count, 2);
        assert_eq!(judgments[0].evaluation, Verdict::Unmatched);
    }

    #[test]
    fn test_parse_match_rejects_out_of_range() {
        assert!(matches!(
            parse_match(r#"{"match": 3}"#, 2),
            Err(Error::ParseFailure(_))
        ));
        assert!(matches!(
            parse_match("no idea", 2),
            Err(Error::ParseFailure(_))
        ));
        assert_eq!(parse_match(r#"{"match": 1}"#, 2).unwrap(), Some(0));
    }
}
