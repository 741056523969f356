//! Discrepancy analysis between score sources
//!
//! Pure and deterministic: the report is recomputed on every read and never
//! stored, so it cannot drift from the underlying scores.

use super::evaluation::Evaluation;
use serde::{Deserialize, Serialize};

/// Default maximum tolerated gap between two score sources
pub const DEFAULT_DISCREPANCY_THRESHOLD: f64 = 1.0;

/// Divergence between self, manager and averaged peer scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    /// Largest pairwise absolute difference (0 when fewer than two sources)
    pub max_diff: f64,
    /// `max_diff > threshold`
    pub has_discrepancy: bool,
    pub self_vs_manager: Option<f64>,
    pub manager_vs_peers: Option<f64>,
    pub self_vs_peers: Option<f64>,
    /// Mean of the peer scores, if any were given
    pub peer_average: Option<f64>,
}

/// Mean of a score list, `None` when empty
pub fn average(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

fn gap(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some((a? - b?).abs())
}

/// Compare every available pair of {self, manager, average(peers)}
///
/// Sources that are absent are left out rather than treated as zero.
pub fn analyze(evaluation: &Evaluation, threshold: f64) -> DiscrepancyReport {
    let peer_average = average(&evaluation.peer_scores);
    let self_vs_manager = gap(evaluation.self_score, evaluation.manager_score);
    let manager_vs_peers = gap(evaluation.manager_score, peer_average);
    let self_vs_peers = gap(evaluation.self_score, peer_average);

    let max_diff = [self_vs_manager, manager_vs_peers, self_vs_peers]
        .into_iter()
        .flatten()
        .fold(0.0_f64, f64::max);

    DiscrepancyReport {
        max_diff,
        has_discrepancy: max_diff > threshold,
        self_vs_manager,
        manager_vs_peers,
        self_vs_peers,
        peer_average,
    }
}
