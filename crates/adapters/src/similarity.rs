//! Lookup of similar previously rejected comments over HTTP

use crate::error::AdapterError;
use crate::http::{build_client, read_json, request_failed};
use async_trait::async_trait;
use reqwest::Client;
use review_eval_core::{Result, SimilarityStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct SimilarityRequest<'a> {
    comments: &'a [String],
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SimilarityResponse {
    comments: Vec<String>,
}

/// Client for a service that returns rejected comments similar to a query set
pub struct HttpSimilarityStore {
    client: Client,
    endpoint: String,
    limit: usize,
}

impl HttpSimilarityStore {
    pub fn new(endpoint: impl Into<String>, limit: usize, timeout_secs: u64) -> Result<Self> {
        if limit == 0 {
            return Err(AdapterError::InvalidConfig(
                "similarity.limit must be greater than 0".to_string(),
            )
            .into());
        }
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: endpoint.into(),
            limit,
        })
    }
}

#[async_trait]
impl SimilarityStore for HttpSimilarityStore {
    async fn get_similar_rejected_comments(&self, candidates: &[String]) -> Result<Vec<String>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let request = SimilarityRequest {
            comments: candidates,
            limit: self.limit,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_failed(&self.endpoint, e))?;
        let body: SimilarityResponse = read_json(&self.endpoint, response).await?;

        debug!(
            "Similarity store returned {} rejected comments for {} candidates",
            body.comments.len(),
            candidates.len()
        );
        Ok(body.comments)
    }
}
