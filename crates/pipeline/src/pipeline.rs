//! The two-phase evaluation pipeline
//!
//! Phase 1 ([`EvaluationPipeline::generate_checkpoints`]) turns review requests
//! into checkpoint records, evaluating the first configured variant on the
//! way. Phase 2 ([`EvaluationPipeline::compare_variants`]) replays every
//! configured variant over the checkpoint and collects scored rows.
//!
//! Requests are processed one at a time in selection order, and the variants
//! of a request one after another.

use crate::aggregator::EvaluationAccumulator;
use crate::checkpoint::CheckpointStore;
use crate::evaluator::{stored_rows, EvaluatorAdapter};
use crate::filtering::{parse_filtered_comments, FilterInput, FilteringStrategy};
use crate::generator::{CandidateGenerator, Candidates, GenerationOutcome};
use review_eval_core::{
    CheckpointRecord, Comment, Config, Error, GroundTruthEvaluator, LanguageModel, PatchStore,
    Result, ReviewRequest, SimilarityStore, SkipReason, SuggestionGenerator, VariantEvaluation,
};
use std::sync::Arc;
use tracing::{info, warn};

/// External services the pipeline depends on
#[derive(Clone)]
pub struct Collaborators {
    pub patch_store: Arc<dyn PatchStore>,
    pub suggestion_generator: Arc<dyn SuggestionGenerator>,
    /// When absent, the configured default rejected examples are used
    pub similarity_store: Option<Arc<dyn SimilarityStore>>,
    pub language_model: Arc<dyn LanguageModel>,
    pub evaluator: Arc<dyn GroundTruthEvaluator>,
}

/// Result of processing one review request in phase 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Processed(Box<CheckpointRecord>),
    Skipped { reason: SkipReason },
}

/// What phase 1 wrote and what it left out
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub records: usize,
    pub skipped: Vec<(ReviewRequest, SkipReason)>,
}

impl GenerationReport {
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|(_, r)| *r == reason).count()
    }
}

pub struct EvaluationPipeline {
    generator: CandidateGenerator,
    language_model: Arc<dyn LanguageModel>,
    evaluator: EvaluatorAdapter,
    strategies: Vec<FilteringStrategy>,
    checkpoint: CheckpointStore,
}

impl EvaluationPipeline {
    /// `strategies` run in the given order; the first one is the baseline
    /// evaluated during generation.
    pub fn new(
        collaborators: Collaborators,
        strategies: Vec<FilteringStrategy>,
        default_rejected_examples: impl Into<String>,
        checkpoint: CheckpointStore,
    ) -> Result<Self> {
        if strategies.is_empty() {
            return Err(Error::config(
                "At least one filtering variant must be configured",
            ));
        }

        let generator = CandidateGenerator::new(
            collaborators.patch_store,
            collaborators.suggestion_generator,
            collaborators.similarity_store,
            default_rejected_examples,
        );

        Ok(Self {
            generator,
            language_model: collaborators.language_model,
            evaluator: EvaluatorAdapter::new(collaborators.evaluator),
            strategies,
            checkpoint,
        })
    }

    pub fn from_config(config: &Config, collaborators: Collaborators) -> Result<Self> {
        let strategies = config
            .filtering
            .variants
            .iter()
            .map(|v| FilteringStrategy::from_config(v, &config.generation.target_software))
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            collaborators,
            strategies,
            config.similarity.default_rejected_examples.clone(),
            CheckpointStore::new(config.checkpoint.path.clone()),
        )
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    /// Generate candidates for one request and evaluate the baseline variant
    pub async fn process_request(&self, request: &ReviewRequest) -> Result<RequestOutcome> {
        let candidates = match self.generator.generate(request).await? {
            GenerationOutcome::Generated(candidates) => candidates,
            GenerationOutcome::Skipped(reason) => return Ok(RequestOutcome::Skipped { reason }),
        };

        let evaluation_for_original = self.evaluate_baseline(request, &candidates).await?;
        let Candidates {
            patch,
            raw_output,
            rejected_examples,
        } = candidates;

        Ok(RequestOutcome::Processed(Box::new(CheckpointRecord {
            rejected_examples,
            raw_output,
            patch,
            revision_id: request.revision_id.clone(),
            review_request: request.clone(),
            evaluation_for_original,
        })))
    }

    async fn evaluate_baseline(
        &self,
        request: &ReviewRequest,
        candidates: &Candidates,
    ) -> Result<Option<VariantEvaluation>> {
        let Some(baseline) = self.strategies.first() else {
            return Ok(None);
        };
        let input = FilterInput {
            raw_output: &candidates.raw_output,
            patch: &candidates.patch,
            rejected_examples: &candidates.rejected_examples,
        };

        let filtered = self.filtered_comments(baseline, &input).await;
        let Some(comments) = recover_skip(filtered, baseline, request)? else {
            return Ok(None);
        };
        let judgments = self.evaluator.judge(&request.patch_id, &comments).await?;
        Ok(Some(VariantEvaluation {
            variant_name: baseline.name().to_string(),
            judgments,
        }))
    }

    async fn filtered_comments(
        &self,
        strategy: &FilteringStrategy,
        input: &FilterInput<'_>,
    ) -> Result<Vec<Comment>> {
        let filtered = strategy
            .filter(self.language_model.as_ref(), input)
            .await?;
        parse_filtered_comments(&filtered, input.patch)
    }

    /// Phase 1: process every request and persist the successful ones
    pub async fn generate_checkpoints(
        &self,
        requests: &[ReviewRequest],
    ) -> Result<GenerationReport> {
        info!(
            "Generating candidates for {} review requests",
            requests.len()
        );

        let mut records = Vec::new();
        let mut report = GenerationReport::default();
        for (i, request) in requests.iter().enumerate() {
            info!(
                "[{}/{}] revision {} (diff {})",
                i + 1,
                requests.len(),
                request.revision_id,
                request.patch_id
            );
            match self.process_request(request).await? {
                RequestOutcome::Processed(record) => records.push(*record),
                RequestOutcome::Skipped { reason } => {
                    report.skipped.push((request.clone(), reason));
                }
            }
        }

        self.checkpoint.save(&records)?;
        report.records = records.len();
        info!(
            "Generation finished: {} checkpointed, {} skipped",
            report.records,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Phase 2: evaluate every variant over the saved checkpoint
    pub async fn compare_variants(
        &self,
        accumulator: EvaluationAccumulator,
    ) -> Result<EvaluationAccumulator> {
        let records = self.checkpoint.load()?;
        self.compare_records(&records, accumulator).await
    }

    pub async fn compare_records(
        &self,
        records: &[CheckpointRecord],
        mut accumulator: EvaluationAccumulator,
    ) -> Result<EvaluationAccumulator> {
        info!(
            "Comparing {} variants over {} checkpointed requests",
            self.strategies.len(),
            records.len()
        );

        for record in records {
            for strategy in &self.strategies {
                let stored = record
                    .evaluation_for_original
                    .as_ref()
                    .filter(|e| e.variant_name == strategy.name());

                if let Some(evaluation) = stored {
                    accumulator.extend(stored_rows(evaluation, record));
                    continue;
                }

                let input = FilterInput::from_record(record);
                let filtered = self.filtered_comments(strategy, &input).await;
                let Some(comments) = recover_skip(filtered, strategy, &record.review_request)?
                else {
                    continue;
                };
                let rows = self
                    .evaluator
                    .evaluate(strategy.name(), record, &comments)
                    .await?;
                accumulator.extend(rows);
            }
        }

        info!("Collected {} evaluation rows", accumulator.len());
        Ok(accumulator)
    }

    /// Both phases back to back
    pub async fn run(
        &self,
        requests: &[ReviewRequest],
        accumulator: EvaluationAccumulator,
    ) -> Result<(GenerationReport, EvaluationAccumulator)> {
        let report = self.generate_checkpoints(requests).await?;
        let accumulator = self.compare_variants(accumulator).await?;
        Ok((report, accumulator))
    }
}

/// Turn a skip raised while validating a variant's filtered comments into
/// `None`; other errors propagate
fn recover_skip<T>(
    result: Result<T>,
    strategy: &FilteringStrategy,
    request: &ReviewRequest,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.skip_reason().is_some() => {
            warn!(
                "Skipping variant '{}' for revision {} (diff {}): {e}",
                strategy.name(),
                request.revision_id,
                request.patch_id
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
