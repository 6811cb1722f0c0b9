//! Exhaustive pairwise duplicate matching over normalized names.

use log::debug;

use crate::matching::similarity;
use crate::models::{MatchCandidate, MatchMode, OrgRecord};

/// Compare every unordered record pair (i < j) and keep those whose
/// normalized-name similarity meets `threshold` (inclusive).
///
/// O(n²) scorer invocations; acceptable for organizational directories
/// (thousands of rows, not millions). The threshold is caller-supplied
/// and deliberately not clamped: scores never leave [0,100], so a
/// threshold above 100 yields no candidates and a negative one yields
/// every pair.
///
/// The result is sorted by descending score, ties broken by ascending
/// `(index_a, index_b)`.
pub fn find_matches(records: &[OrgRecord], threshold: f64, mode: MatchMode) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();
    let mut pairs_compared = 0usize;

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            pairs_compared += 1;
            let score =
                similarity::score(&records[i].normalized_name, &records[j].normalized_name, mode);
            if score >= threshold {
                candidates.push(MatchCandidate {
                    index_a: i,
                    index_b: j,
                    score,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.index_a.cmp(&b.index_a))
            .then(a.index_b.cmp(&b.index_b))
    });

    debug!(
        "{} matching: {} of {} pairs at or above threshold {}",
        mode.as_str(),
        candidates.len(),
        pairs_compared,
        threshold
    );
    candidates
}
