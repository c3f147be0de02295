//! OpenAI-compatible chat completions provider

use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use review_eval_core::{LanguageModel, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Request payload for the chat completions API
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Language model backed by an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider
    ///
    /// # Arguments
    /// * `api_base_url` - Base URL of the API (e.g., "https://api.openai.com/v1")
    /// * `api_key` - Bearer token, omitted for self-hosted servers
    /// * `model` - Model name (e.g., "gpt-4o")
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(
        api_base_url: String,
        api_key: Option<String>,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        info!("Initializing OpenAI-compatible language model");
        info!("  Model: {model}");
        info!("  API Base URL: {api_base_url}");
        info!("  Timeout: {timeout_secs}s");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature: 0.2,
            max_tokens: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Pull the text of the first choice out of a completion response
fn first_choice_text(response: ChatCompletionResponse) -> std::result::Result<String, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

    if choice.finish_reason.as_deref() == Some("length") {
        warn!("LLM response was truncated at the token limit");
    }

    choice
        .message
        .content
        .ok_or_else(|| LlmError::InvalidResponse("first choice has no content".to_string()))
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.api_base_url);
        debug!("Sending completion request ({} prompt chars)", prompt.len());

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(format!("Completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(LlmError::RequestFailed(format!(
                "Completion API returned error {status}: {error_text}"
            ))
            .into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse completion response: {e}"))
        })?;

        let text = first_choice_text(completion)?;
        debug!("Completion returned {} chars", text.len());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice_text() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "[]"}, "finish_reason": "stop"}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "[]");
    }

    #[test]
    fn test_first_choice_text_without_choices() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_request_omits_missing_max_tokens() {
        let request = ChatCompletionRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.0,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenAiCompatibleProvider::new(
            "http://localhost:8001/v1/".to_string(),
            None,
            "local-model".to_string(),
            5,
        )
        .unwrap();
        assert_eq!(provider.api_base_url, "http://localhost:8001/v1");
        assert_eq!(provider.model_name(), "local-model");
    }
}
