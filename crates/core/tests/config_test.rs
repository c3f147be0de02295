use review_eval_core::config::{Config, LlmConfig, SelectionMode, SimilarityConfig};

#[test]
fn test_llm_config_defaults() {
    let config = LlmConfig::default();
    assert_eq!(config.provider, "openai");
    assert_eq!(config.model, "gpt-4o");
    assert!(config.api_base_url.is_none());
    assert_eq!(config.timeout_secs, 120);
    assert!(config.api_key.is_none());
}

#[test]
fn test_similarity_is_unconfigured_by_default() {
    let config = SimilarityConfig::default();
    assert!(config.endpoint.is_none());
    assert_eq!(config.limit, 10);
    assert!(!config.default_rejected_examples.is_empty());
}

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert_eq!(config.selection.mode, SelectionMode::Reproduce);
    assert_eq!(config.generation.max_diff_bytes, 20_000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_temperature() {
    let mut config = Config::default();

    config.llm.temperature = 0.0;
    assert!(config.validate().is_ok());

    config.llm.temperature = 2.0;
    assert!(config.validate().is_ok());

    config.llm.temperature = 2.5;
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid temperature"));
}

#[test]
fn test_config_validation_max_diff_bytes() {
    let mut config = Config::default();
    config.generation.max_diff_bytes = 0;
    let result = config.validate();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid max_diff_bytes"));
}
