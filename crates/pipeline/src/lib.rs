//! Multi-variant evaluation pipeline for generated review comments
//!
//! Turns a list of review requests into a resumable checkpoint of generated
//! candidates, then scores every configured filtering variant over the same
//! checkpoint and collects the judgments into one results table.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod aggregator;
pub mod checkpoint;
pub mod evaluator;
pub mod filtering;
pub mod generator;
pub mod metrics;
mod pipeline;
pub mod selector;

pub use aggregator::EvaluationAccumulator;
pub use checkpoint::CheckpointStore;
pub use filtering::{FilterInput, FilteringStrategy};
pub use pipeline::{Collaborators, EvaluationPipeline, GenerationReport, RequestOutcome};
