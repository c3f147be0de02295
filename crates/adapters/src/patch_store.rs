//! Patch retrieval over HTTP

use crate::error::AdapterError;
use crate::http::{build_client, read_json, request_failed};
use async_trait::async_trait;
use reqwest::Client;
use review_eval_core::config::PatchStoreConfig;
use review_eval_core::{Patch, PatchFile, PatchStore, Result};
use serde::Deserialize;
use tracing::debug;

/// Body of `GET {base_url}/patches/{patch_id}`
#[derive(Debug, Deserialize)]
struct PatchResponse {
    raw_diff: String,
    #[serde(default)]
    files: Vec<PatchFile>,
}

/// Fetches diffs from a patch service that serves them as JSON
pub struct HttpPatchStore {
    client: Client,
    base_url: String,
}

impl HttpPatchStore {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url: String = base_url.into();
        if base_url.trim().is_empty() {
            return Err(
                AdapterError::InvalidConfig("patch_store.base_url is empty".to_string()).into(),
            );
        }
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PatchStoreConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.timeout_secs)
    }

    fn patch_url(&self, patch_id: &str) -> String {
        format!("{}/patches/{patch_id}", self.base_url)
    }
}

#[async_trait]
impl PatchStore for HttpPatchStore {
    async fn get_patch_by_id(&self, patch_id: &str) -> Result<Patch> {
        let url = self.patch_url(patch_id);
        debug!("Fetching patch {patch_id} from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_failed(&url, e))?;
        let body: PatchResponse = read_json(&url, response).await?;

        debug!(
            "Patch {patch_id}: {} bytes across {} files",
            body.raw_diff.len(),
            body.files.len()
        );

        Ok(Patch {
            patch_id: patch_id.to_string(),
            raw_diff: body.raw_diff,
            files: body.files,
        })
    }
}
