//! Resolving the review requests to evaluate
//!
//! Two modes are supported: reproducing the request set of the most recent
//! results file, or drawing a seeded random sample from the labeled dataset.

use crate::aggregator::{parse_results_file_name, RESULTS_FILE_PATTERN};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use review_eval_core::{Error, Result, ReviewRequest};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Drop repeated (revision_id, patch_id) pairs, keeping first occurrences in order
pub fn dedup_requests(requests: impl IntoIterator<Item = ReviewRequest>) -> Vec<ReviewRequest> {
    let mut seen = HashSet::new();
    requests
        .into_iter()
        .filter(|r| seen.insert((r.revision_id.clone(), r.patch_id.clone())))
        .collect()
}

/// The results file with the most recent embedded timestamp in `dir`
pub fn latest_results_file(dir: &Path) -> Result<PathBuf> {
    let not_found = || {
        Error::not_found(format!(
            "No previous results in {}: expected a file named {RESULTS_FILE_PATTERN}",
            dir.display()
        ))
    };

    if !dir.is_dir() {
        return Err(not_found());
    }

    let mut latest: Option<(chrono::NaiveDateTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(timestamp) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_results_file_name)
        else {
            continue;
        };
        if latest.as_ref().is_none_or(|(best, _)| timestamp > *best) {
            latest = Some((timestamp, path));
        }
    }

    latest.map(|(_, path)| path).ok_or_else(not_found)
}

#[derive(Debug, Deserialize)]
struct RequestColumns {
    revision_id: String,
    diff_id: String,
}

/// Review requests of the most recent results file, deduplicated
pub fn reproduce_requests(results_dir: &Path) -> Result<Vec<ReviewRequest>> {
    let path = latest_results_file(results_dir)?;
    info!("Reproducing review requests from {}", path.display());

    let mut reader = csv::Reader::from_reader(File::open(&path)?);
    let mut requests = Vec::new();
    for record in reader.deserialize::<RequestColumns>() {
        let record = record.map_err(|e| Error::csv(format!("{}: {e}", path.display())))?;
        requests.push(ReviewRequest::new(record.revision_id, record.diff_id));
    }

    let requests = dedup_requests(requests);
    info!("Selected {} review requests", requests.len());
    Ok(requests)
}

/// A reproducible random sample of `sample_size` distinct requests
pub fn sample_requests(
    population: Vec<ReviewRequest>,
    sample_size: usize,
    seed: u64,
) -> Vec<ReviewRequest> {
    let mut requests = dedup_requests(population);
    if requests.len() < sample_size {
        warn!(
            "Requested {sample_size} review requests but only {} are available",
            requests.len()
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    requests.shuffle(&mut rng);
    requests.truncate(sample_size);

    info!(
        "Sampled {} review requests with seed {seed}",
        requests.len()
    );
    requests
}
