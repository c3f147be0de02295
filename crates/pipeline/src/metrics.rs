//! Per-variant summary metrics over evaluation rows.
//!
//! Metrics implemented:
//! - **Precision**: correct / (correct + incorrect), over matched comments only
//! - **Match rate**: fraction of generated comments matched to a ground-truth comment
//! - **Comments per request**: surviving comments per evaluated diff

use review_eval_core::{EvaluationRow, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write;

/// Computed metrics for one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetrics {
    pub variant_name: String,
    /// Distinct diffs with at least one surviving comment
    pub requests: usize,
    pub total_comments: usize,
    pub matched: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unmatched: usize,
}

impl VariantMetrics {
    fn empty(variant_name: &str) -> Self {
        Self {
            variant_name: variant_name.to_string(),
            requests: 0,
            total_comments: 0,
            matched: 0,
            correct: 0,
            incorrect: 0,
            unmatched: 0,
        }
    }

    /// Returns 0.0 when no comment was matched
    pub fn precision(&self) -> f64 {
        let judged = self.correct + self.incorrect;
        if judged == 0 {
            return 0.0;
        }
        self.correct as f64 / judged as f64
    }

    pub fn match_rate(&self) -> f64 {
        if self.total_comments == 0 {
            return 0.0;
        }
        self.matched as f64 / self.total_comments as f64
    }

    pub fn comments_per_request(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.total_comments as f64 / self.requests as f64
    }
}

/// Metrics per variant, in first-appearance order of the rows
pub fn compute_metrics(rows: &[EvaluationRow]) -> Vec<VariantMetrics> {
    let mut metrics: Vec<VariantMetrics> = Vec::new();
    let mut diffs: Vec<HashSet<&str>> = Vec::new();

    for row in rows {
        let index = match metrics.iter().position(|m| m.variant_name == row.variant_name) {
            Some(index) => index,
            None => {
                metrics.push(VariantMetrics::empty(&row.variant_name));
                diffs.push(HashSet::new());
                metrics.len() - 1
            }
        };

        let m = &mut metrics[index];
        m.total_comments += 1;
        if row.matched {
            m.matched += 1;
        }
        match row.evaluation {
            Verdict::Correct => m.correct += 1,
            Verdict::Incorrect => m.incorrect += 1,
            Verdict::Unmatched => m.unmatched += 1,
        }
        diffs[index].insert(row.diff_id.as_str());
    }

    for (m, seen) in metrics.iter_mut().zip(&diffs) {
        m.requests = seen.len();
    }
    metrics
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn delta(baseline: f64, candidate: f64) -> String {
    let delta = candidate - baseline;
    if delta > 0.001 {
        format!("+{:.1}%", delta * 100.0)
    } else if delta < -0.001 {
        format!("{:.1}%", delta * 100.0)
    } else {
        "0.0%".to_string()
    }
}

/// Render a summary block for every variant, followed by a comparison of each
/// variant against the first one.
pub fn render_report(metrics: &[VariantMetrics]) -> String {
    let mut out = String::new();

    for m in metrics {
        let _ = writeln!(out, "{} (n={} comments):", m.variant_name, m.total_comments);
        let _ = writeln!(out, "  Requests:   {}", m.requests);
        let _ = writeln!(
            out,
            "  Matched:    {} ({})",
            m.matched,
            percent(m.match_rate())
        );
        let _ = writeln!(out, "  Correct:    {}", m.correct);
        let _ = writeln!(out, "  Incorrect:  {}", m.incorrect);
        let _ = writeln!(out, "  Unmatched:  {}", m.unmatched);
        let _ = writeln!(out, "  Precision:  {}", percent(m.precision()));
        let _ = writeln!(out);
    }

    let Some((baseline, others)) = metrics.split_first() else {
        let _ = writeln!(out, "No evaluation rows.");
        return out;
    };

    for other in others {
        let _ = writeln!(out, "{:=<70}", "");
        let _ = writeln!(
            out,
            "COMPARISON: {} vs {}",
            baseline.variant_name, other.variant_name
        );
        let _ = writeln!(out, "{:=<70}", "");
        let _ = writeln!(
            out,
            "{:<20} {:>15} {:>15} {:>12}",
            "Metric", "Baseline", "Variant", "Delta"
        );
        let _ = writeln!(out, "{:-<70}", "");
        let _ = writeln!(
            out,
            "{:<20} {:>15} {:>15} {:>12}",
            "Comments",
            baseline.total_comments,
            other.total_comments,
            format!(
                "{:+}",
                other.total_comments as i64 - baseline.total_comments as i64
            )
        );
        for (label, base, cand) in [
            ("Precision", baseline.precision(), other.precision()),
            ("Match rate", baseline.match_rate(), other.match_rate()),
        ] {
            let _ = writeln!(
                out,
                "{:<20} {:>15} {:>15} {:>12}",
                label,
                percent(base),
                percent(cand),
                delta(base, cand)
            );
        }
        let _ = writeln!(
            out,
            "{:<20} {:>15.2} {:>15.2} {:>12.2}",
            "Comments/request",
            baseline.comments_per_request(),
            other.comments_per_request(),
            other.comments_per_request() - baseline.comments_per_request()
        );
        let _ = writeln!(out);
    }

    out
}

pub fn print_report(metrics: &[VariantMetrics]) {
    print!("{}", render_report(metrics));
}
