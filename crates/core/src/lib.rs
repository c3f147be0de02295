//! Core types and traits for the review comment evaluation harness
//!
//! This crate provides the foundational abstractions used throughout the
//! workspace:
//!
//! - **Models**: review requests, patches, comments, judgments and checkpoint records
//! - **Collaborators**: traits for the patch store, generation tool, similarity
//!   store, language model and ground-truth evaluator
//! - **Configuration**: layered configuration loading
//! - **Error handling**: unified error types and skip classification

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;

// Re-export main types for convenience
pub use collaborators::{
    GroundTruthEvaluator, LanguageModel, PatchStore, SimilarityStore, SuggestionGenerator,
};
pub use config::Config;
pub use error::{Error, Result, ResultExt, SkipReason};
pub use models::{
    CandidateComment, CheckpointRecord, Comment, EvaluationRow, Judgment, Patch, PatchFile,
    ReviewRequest, VariantEvaluation, Verdict,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
