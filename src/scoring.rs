use crate::data::{PairCandidate, Resident};
use itertools::Itertools;
use log::trace;

/// Weighted L1 distance between two attribute vectors. Lower is more compatible.
pub fn compatibility_cost(a: &[f64], b: &[f64], weights: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .zip(weights)
        .map(|((x, y), w)| w * (x - y).abs())
        .sum()
}

/// Every unordered same-gender pair (a < b) with its cost.
///
/// Quadratic in the number of residents; this dominates the pre-solve work.
pub fn candidate_pairs(residents: &[Resident], weights: &[f64]) -> Vec<PairCandidate> {
    let candidates: Vec<PairCandidate> = residents
        .iter()
        .tuple_combinations()
        .filter(|(x, y)| x.gender == y.gender)
        .map(|(x, y)| PairCandidate {
            a: x.index.min(y.index),
            b: x.index.max(y.index),
            cost: compatibility_cost(&x.attributes, &y.attributes, weights),
        })
        .collect();
    trace!(
        "Scored {} same-gender pairs out of {} total pairs.",
        candidates.len(),
        residents.len() * residents.len().saturating_sub(1) / 2
    );
    candidates
}
