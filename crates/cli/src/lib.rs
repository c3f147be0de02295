//! Library interface for the review-eval CLI
//!
//! Wires configuration to concrete collaborators. Kept out of main.rs so the
//! wiring can be exercised by integration tests.

use anyhow::{Context, Result};
use review_eval_adapters::{
    HttpPatchStore, HttpSimilarityStore, LabeledDataset, LabeledDatasetEvaluator,
    LlmSuggestionGenerator,
};
use review_eval_core::config::SelectionMode;
use review_eval_core::{ReviewRequest, SimilarityStore};
use review_eval_pipeline::selector::{reproduce_requests, sample_requests};
use review_eval_pipeline::Collaborators;
use std::sync::Arc;
use tracing::info;

// Re-export commonly needed types for tests
pub use review_eval_core::config::Config;

/// Load the labeled ground-truth dataset named in the configuration
pub fn load_dataset(config: &Config) -> Result<Arc<LabeledDataset>> {
    let dataset = LabeledDataset::load(&config.dataset.path).with_context(|| {
        format!(
            "Failed to load labeled dataset from {}",
            config.dataset.path.display()
        )
    })?;
    Ok(Arc::new(dataset))
}

/// Resolve the review requests for this run according to `selection.mode`
pub fn select_requests(config: &Config, dataset: &LabeledDataset) -> Result<Vec<ReviewRequest>> {
    let requests = match config.selection.mode {
        SelectionMode::Reproduce => reproduce_requests(&config.selection.results_dir)?,
        SelectionMode::Sample => sample_requests(
            dataset.review_requests(),
            config.selection.sample_size,
            config.selection.seed,
        ),
    };
    Ok(requests)
}

/// Build the concrete collaborators described by the configuration
pub fn build_collaborators(config: &Config, dataset: Arc<LabeledDataset>) -> Result<Collaborators> {
    let language_model = review_eval_llm::create_language_model(&config.llm)
        .context("Failed to create language model")?;
    info!("Using language model {}", language_model.model_name());

    let patch_store = HttpPatchStore::from_config(&config.patch_store)
        .context("Failed to create patch store client")?;

    let similarity_store = match &config.similarity.endpoint {
        Some(endpoint) => {
            info!("Using similarity store at {endpoint}");
            let store = HttpSimilarityStore::new(
                endpoint.clone(),
                config.similarity.limit,
                config.similarity.timeout_secs,
            )
            .context("Failed to create similarity store client")?;
            Some(Arc::new(store) as Arc<dyn SimilarityStore>)
        }
        None => {
            info!("No similarity store configured; using default rejected examples");
            None
        }
    };

    Ok(Collaborators {
        patch_store: Arc::new(patch_store),
        suggestion_generator: Arc::new(LlmSuggestionGenerator::new(
            language_model.clone(),
            &config.generation,
        )),
        similarity_store,
        language_model: language_model.clone(),
        evaluator: Arc::new(LabeledDatasetEvaluator::new(dataset, language_model)),
    })
}
