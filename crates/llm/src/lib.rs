//! Language model providers for rendering filtering and judging prompts
//!
//! This crate provides implementations of the core `LanguageModel` trait and
//! helpers for extracting structured payloads from model output.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use review_eval_core::config::{LlmConfig, DEFAULT_OPENAI_API_BASE_URL};
use review_eval_core::{Error, LanguageModel, Result};
use std::sync::Arc;
use tracing::info;

pub mod error;
mod openai;
pub mod prompt;
pub mod response;

pub use error::LlmError;
pub use openai::OpenAiCompatibleProvider;
pub use prompt::format_prompt;

/// Create a language model based on configuration
///
/// # Arguments
/// * `config` - LLM configuration including provider type
pub fn create_language_model(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                Error::config(
                    "OpenAI API key required. Set llm.api_key or OPENAI_API_KEY env var"
                        .to_string(),
                )
            })?;
            let api_base_url = config
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE_URL.to_string());

            info!("Creating OpenAI language model");
            let provider = OpenAiCompatibleProvider::new(
                api_base_url,
                Some(api_key),
                config.model.clone(),
                config.timeout_secs,
            )?
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);

            Ok(Arc::new(provider))
        }
        "local" => {
            let api_base_url = config.api_base_url.clone().ok_or_else(|| {
                Error::config("llm.api_base_url is required for the local provider".to_string())
            })?;

            info!("Creating local OpenAI-compatible language model");
            let provider = OpenAiCompatibleProvider::new(
                api_base_url,
                config.api_key.clone(),
                config.model.clone(),
                config.timeout_secs,
            )?
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);

            Ok(Arc::new(provider))
        }
        other => Err(Error::config(format!(
            "Unknown llm provider: '{other}'. Valid providers: openai, local"
        ))),
    }
}
