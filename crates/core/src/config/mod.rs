//! Configuration module for the evaluation harness
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//! Every section has defaults, so an empty file is a valid configuration.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub use defaults::{DEFAULT_OPENAI_API_BASE_URL, DEFAULT_REJECTED_EXAMPLES};

use defaults::*;

/// Names of the filtering prompt templates shipped with the pipeline
pub const BUILTIN_TEMPLATES: [&str; 2] = ["current", "new"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub patch_store: PatchStoreConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,

    #[serde(default)]
    pub filtering: FilteringConfig,
}

/// How review requests are chosen for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Re-run the requests of the most recent results file
    #[default]
    Reproduce,
    /// Draw a fresh random sample from the labeled dataset
    Sample,
}

/// Review request selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub mode: SelectionMode,

    /// Directory searched for previous results files (reproduce mode)
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Number of distinct review requests to sample (sample mode)
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// RNG seed so samples are reproducible
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Labeled ground-truth dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// CSV file of previously accepted/rejected review comments
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default = "default_checkpoint_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `evaluation_results_<timestamp>.csv`
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Candidate comment generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name of the software under review, bound into prompts
    #[serde(default = "default_target_software")]
    pub target_software: String,

    /// Patches with a larger raw diff are skipped as too large
    #[serde(default = "default_max_diff_bytes")]
    pub max_diff_bytes: usize,
}

/// Language model provider
///
/// # Providers
/// - `openai` (default): OpenAI chat completions, requires an API key
/// - `local`: any OpenAI-compatible server (vLLM, llama.cpp), no key required
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Required for `local`; `openai` falls back to the public endpoint
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Falls back to the `OPENAI_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

/// Patch retrieval service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchStoreConfig {
    #[serde(default = "default_patch_store_url")]
    pub base_url: String,

    #[serde(default = "default_patch_store_timeout_secs")]
    pub timeout_secs: u64,
}

/// Similar rejected comment lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Service endpoint; when unset the default rejected examples are used
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Maximum number of similar comments requested
    #[serde(default = "default_similarity_limit")]
    pub limit: usize,

    #[serde(default = "default_similarity_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_rejected_examples")]
    pub default_rejected_examples: String,
}

/// Filtering variants compared side by side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteringConfig {
    /// The first variant is the baseline evaluated during generation
    #[serde(default = "default_variants")]
    pub variants: Vec<VariantConfig>,
}

/// One filtering strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Label written to the `variant_name` column
    pub name: String,

    /// Built-in template name (`current` or `new`)
    #[serde(default)]
    pub template: String,

    /// Custom template file, takes precedence over `template`
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::default(),
            results_dir: default_results_dir(),
            sample_size: default_sample_size(),
            seed: default_seed(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            path: default_checkpoint_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_software: default_target_software(),
            max_diff_bytes: default_max_diff_bytes(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_base_url: None,
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl Default for PatchStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_patch_store_url(),
            timeout_secs: default_patch_store_timeout_secs(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            limit: default_similarity_limit(),
            timeout_secs: default_similarity_timeout_secs(),
            default_rejected_examples: default_rejected_examples(),
        }
    }
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            variants: default_variants(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["openai", "local"];
        if !valid_providers.contains(&self.llm.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid llm provider '{}'. Must be one of: {:?}",
                self.llm.provider, valid_providers
            )));
        }

        if self.llm.provider == "local" && self.llm.api_base_url.is_none() {
            return Err(Error::config(
                "llm.api_base_url is required for the local provider".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::config(format!(
                "Invalid temperature {}. Must be between 0.0 and 2.0",
                self.llm.temperature
            )));
        }

        if self.selection.mode == SelectionMode::Sample && self.selection.sample_size == 0 {
            return Err(Error::config(
                "Invalid sample size 0. Must be greater than 0".to_string(),
            ));
        }

        if self.generation.max_diff_bytes == 0 {
            return Err(Error::config(
                "Invalid max_diff_bytes 0. Must be greater than 0".to_string(),
            ));
        }

        if self.similarity.limit == 0 {
            return Err(Error::config(
                "Invalid similarity limit 0. Must be greater than 0".to_string(),
            ));
        }

        self.validate_variants()
    }

    fn validate_variants(&self) -> Result<()> {
        let variants = &self.filtering.variants;
        if variants.is_empty() {
            return Err(Error::config(
                "At least one filtering variant must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for variant in variants {
            if variant.name.trim().is_empty() {
                return Err(Error::config("Filtering variant names cannot be empty"));
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(Error::config(format!(
                    "Duplicate filtering variant name '{}'",
                    variant.name
                )));
            }
            if variant.template_path.is_none()
                && !BUILTIN_TEMPLATES.contains(&variant.template.as_str())
            {
                return Err(Error::config(format!(
                    "Invalid template '{}' for variant '{}'. Must be one of: {:?} or set template_path",
                    variant.template, variant.name, BUILTIN_TEMPLATES
                )));
            }
        }

        Ok(())
    }

    /// Names of the configured variants, in evaluation order
    pub fn variant_names(&self) -> Vec<&str> {
        self.filtering
            .variants
            .iter()
            .map(|v| v.name.as_str())
            .collect()
    }
}
