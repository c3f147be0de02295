//! Default values and functions for configuration

use std::path::PathBuf;

use super::VariantConfig;

// Default constants
pub(crate) const DEFAULT_LLM_PROVIDER: &str = "openai";
pub(crate) const DEFAULT_LLM_MODEL: &str = "gpt-4o";
/// Endpoint used by the `openai` provider when `llm.api_base_url` is unset
pub const DEFAULT_OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_PATCH_STORE_URL: &str = "http://localhost:8080";
pub(crate) const DEFAULT_TARGET_SOFTWARE: &str = "Mozilla Firefox";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "review-eval.toml";

/// Substituted for similar rejected comments when no similarity store is configured
pub const DEFAULT_REJECTED_EXAMPLES: &str = "\
Please note that these are minor improvements and the overall quality of the patch is good.
This change looks fine, but consider adding a comment explaining the new variable.
The function was renamed; make sure all callers are updated.
Is this change intentional?
Thanks for cleaning this up!";

pub(crate) fn default_results_dir() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn default_sample_size() -> usize {
    100
}

pub(crate) fn default_seed() -> u64 {
    42
}

pub(crate) fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/labeled_review_comments.csv")
}

pub(crate) fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("evaluation_checkpoint.json")
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

pub(crate) fn default_target_software() -> String {
    DEFAULT_TARGET_SOFTWARE.to_string()
}

pub(crate) fn default_max_diff_bytes() -> usize {
    20_000
}

pub(crate) fn default_llm_provider() -> String {
    DEFAULT_LLM_PROVIDER.to_string()
}

pub(crate) fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

pub(crate) fn default_llm_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_temperature() -> f32 {
    0.2
}

pub(crate) fn default_patch_store_url() -> String {
    DEFAULT_PATCH_STORE_URL.to_string()
}

pub(crate) fn default_patch_store_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_similarity_limit() -> usize {
    10
}

pub(crate) fn default_similarity_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_rejected_examples() -> String {
    DEFAULT_REJECTED_EXAMPLES.to_string()
}

pub(crate) fn default_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            name: "Current Filtering".to_string(),
            template: "current".to_string(),
            template_path: None,
        },
        VariantConfig {
            name: "New Filtering".to_string(),
            template: "new".to_string(),
            template_path: None,
        },
    ]
}
