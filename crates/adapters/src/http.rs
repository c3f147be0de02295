//! Shared plumbing for the JSON-over-HTTP collaborators

use crate::error::AdapterError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, AdapterError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AdapterError::InvalidConfig(format!("Failed to create HTTP client: {e}")))
}

/// Check the status and decode the JSON body of a response
pub(crate) async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: Response,
) -> Result<T, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(AdapterError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AdapterError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn request_failed(url: &str, err: reqwest::Error) -> AdapterError {
    AdapterError::RequestFailed {
        url: url.to_string(),
        message: err.to_string(),
    }
}
