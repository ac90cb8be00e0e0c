use crate::backend::{FailureKind, SolverBackend};
use crate::config::{PairingMode, Settings};
use crate::data::{AssignmentInput, AssignmentReport};
use crate::decode::decode;
use crate::error::{AssignError, Result};
use crate::model::Model;
use crate::normalize::normalize;
use crate::precheck::precheck;
use crate::scoring::candidate_pairs;
use crate::tables::{parse_key, parse_preferences, parse_rooms};
use log::{info, warn};
use std::time::Instant;

/// Pairs residents into rooms: normalize, score, build, solve, decode.
///
/// Synchronous; every call builds its own model so calls may run in parallel.
pub fn solve(
    input: &AssignmentInput,
    settings: &Settings,
    backend: &dyn SolverBackend,
) -> Result<AssignmentReport> {
    let start_time = Instant::now();

    let (categories, mut warnings) = parse_key(&input.key, &settings.normalization)?;
    let rooms = parse_rooms(&input.rooms)?;
    let raw = parse_preferences(&input.preferences, &categories)?;
    let normalized = normalize(&raw, &categories, &settings.normalization)?;
    warnings.extend(normalized.warnings);
    let residents = normalized.residents;
    let weights: Vec<f64> = categories.iter().map(|c| c.weight).collect();

    info!(
        "Pairing {} residents into {} rooms over {} categories...",
        residents.len(),
        rooms.len(),
        categories.len()
    );
    if residents.is_empty() {
        return Ok(AssignmentReport {
            assignments: Vec::new(),
            unassigned: Vec::new(),
            total_cost: 0.0,
            warnings,
        });
    }

    let pairing = &settings.pairing;
    let diagnostics = precheck(&residents, &rooms, pairing.mode);
    if pairing.precheck && pairing.mode == PairingMode::Strict && !diagnostics.is_empty() {
        return Err(AssignError::Infeasible {
            reason: "pre-check found residents that cannot all be paired".to_string(),
            diagnostics,
        });
    }

    let candidates = candidate_pairs(&residents, &weights);
    let model = Model::build(&residents, &rooms, &candidates, pairing);

    info!("Solving with the {} backend...", backend.name());
    let solution = backend.solve(&model).map_err(|failure| match failure.kind {
        FailureKind::Infeasible => AssignError::Infeasible {
            reason: failure.message,
            diagnostics,
        },
        _ => AssignError::Solver(failure.to_string()),
    })?;

    if !solution.is_optimal() {
        let message = format!(
            "{} stopped at a limit; assignments are the best found, not proven optimal",
            backend.name()
        );
        warn!("{message}");
        warnings.push(message);
    }

    let decoded = decode(&model, &solution, &residents, &rooms)?;
    if pairing.mode == PairingMode::Strict && !decoded.unassigned.is_empty() {
        return Err(AssignError::Solver(format!(
            "solution left residents unpaired: {}",
            decoded.unassigned.join(", ")
        )));
    }

    info!(
        "Paired {} couples ({} unassigned, total cost {}) in {:.2?}",
        decoded.assignments.len(),
        decoded.unassigned.len(),
        decoded.total_cost,
        start_time.elapsed()
    );
    Ok(AssignmentReport {
        assignments: decoded.assignments,
        unassigned: decoded.unassigned,
        total_cost: decoded.total_cost,
        warnings,
    })
}
