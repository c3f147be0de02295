//! Durable storage of post-generation state
//!
//! The checkpoint is a single JSON document:
//!
//! ```json
//! {"format_version": 1, "created_at": "...", "records": [ ... ]}
//! ```
//!
//! It is rewritten in full on every save: the new content goes to a sibling
//! temporary file that is then renamed over the old one. Saving zero records
//! fails with `Error::EmptyCheckpoint` and leaves an existing file untouched.

use chrono::{DateTime, Utc};
use review_eval_core::{CheckpointRecord, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointEnvelope {
    format_version: u32,
    created_at: DateTime<Utc>,
    records: Vec<CheckpointRecord>,
}

/// Reads and writes the checkpoint file at a fixed path
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replace the checkpoint with `records`, preserving their order
    pub fn save(&self, records: &[CheckpointRecord]) -> Result<()> {
        if records.is_empty() {
            return Err(Error::EmptyCheckpoint);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let envelope = CheckpointEnvelope {
            format_version: CHECKPOINT_FORMAT_VERSION,
            created_at: Utc::now(),
            records: records.to_vec(),
        };

        let temp_path = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer_pretty(&mut writer, &envelope)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        info!(
            "Saved {} checkpoint records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<CheckpointRecord>> {
        if !self.path.exists() {
            return Err(Error::not_found(format!(
                "Checkpoint not found at {}; run the generation step first",
                self.path.display()
            )));
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let envelope: CheckpointEnvelope = serde_json::from_reader(reader)?;
        if envelope.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(Error::invalid_input(format!(
                "Unsupported checkpoint format version {} in {} (expected {})",
                envelope.format_version,
                self.path.display(),
                CHECKPOINT_FORMAT_VERSION
            )));
        }

        debug!("Checkpoint created at {}", envelope.created_at);
        info!(
            "Loaded {} checkpoint records from {}",
            envelope.records.len(),
            self.path.display()
        );
        Ok(envelope.records)
    }
}
