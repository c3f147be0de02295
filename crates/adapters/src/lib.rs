//! Concrete collaborators for the evaluation pipeline
//!
//! - [`HttpPatchStore`] and [`HttpSimilarityStore`] talk to JSON services
//! - [`LlmSuggestionGenerator`] prompts a language model for review comments
//! - [`LabeledDataset`] loads the human-labeled ground truth
//! - [`LabeledDatasetEvaluator`] judges new comments against that ground truth

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod dataset;
pub mod error;
mod evaluator;
mod generator;
mod http;
mod patch_store;
mod prompts;
mod similarity;

pub use dataset::{LabeledComment, LabeledDataset};
pub use error::AdapterError;
pub use evaluator::LabeledDatasetEvaluator;
pub use generator::LlmSuggestionGenerator;
pub use patch_store::HttpPatchStore;
pub use similarity::HttpSimilarityStore;
