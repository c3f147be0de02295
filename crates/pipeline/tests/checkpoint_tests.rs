//! Checkpoint persistence contract

use pretty_assertions::assert_eq;
use review_eval_core::{
    CheckpointRecord, Error, Judgment, Patch, PatchFile, ReviewRequest, VariantEvaluation, Verdict,
};
use review_eval_pipeline::CheckpointStore;

fn record(revision: &str, diff: &str, with_baseline: bool) -> CheckpointRecord {
    let evaluation_for_original = with_baseline.then(|| VariantEvaluation {
        variant_name: "Current Filtering".to_string(),
        judgments: vec![Judgment {
            new_comment: "Possible use-after-free".to_string(),
            old_comments_count: 3,
            matched: true,
            old_comment: Some("mFrame may be destroyed here".to_string()),
            evaluation: Verdict::Correct,
        }],
    });

    CheckpointRecord {
        rejected_examples: "Nice patch!\nIs this intentional?".to_string(),
        raw_output: format!("[{{\"file\": \"layout/{diff}.cpp\", \"code_line\": 4, \"comment\": \"ü\"}}]"),
        patch: Patch {
            patch_id: diff.to_string(),
            raw_diff: format!("+++ b/layout/{diff}.cpp\n+  delete mFrame;\n"),
            files: vec![PatchFile {
                path: format!("layout/{diff}.cpp"),
                added_lines: vec![4],
                removed_lines: vec![3],
            }],
        },
        revision_id: revision.to_string(),
        review_request: ReviewRequest::new(revision, diff),
        evaluation_for_original,
    }
}

#[test]
fn test_save_load_save_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("nested").join("checkpoint.json"));
    let records = vec![
        record("3", "30", true),
        record("1", "10", false),
        record("2", "20", true),
    ];

    store.save(&records).unwrap();
    let first = store.load().unwrap();
    assert_eq!(first, records);

    store.save(&first).unwrap();
    let second = store.load().unwrap();
    assert_eq!(second, first);
}

#[test]
fn test_save_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

    store.save(&[record("1", "10", true), record("2", "20", true)]).unwrap();
    store.save(&[record("9", "90", false)]).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].diff_id(), "90");
    assert!(!dir.path().join("checkpoint.json.tmp").exists());
}

#[test]
fn test_empty_save_keeps_existing_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
    store.save(&[record("1", "10", true)]).unwrap();

    assert!(matches!(store.save(&[]), Err(Error::EmptyCheckpoint)));
    assert_eq!(store.load().unwrap().len(), 1);
}

#[test]
fn test_corrupt_checkpoint_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = CheckpointStore::new(path).load().unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}
