//! Binary integer program for pairing residents into rooms.
//!
//! `x[a,b,r] = 1` if residents a and b share room r, 0 otherwise. Variables
//! exist only for same-gender candidate pairs and only for rooms that can hold
//! a pair. The model is solver-neutral; see [`crate::backend`] for execution.

use crate::config::{PairingMode, PairingSettings};
use crate::data::{PairCandidate, PairKey, Resident, Room};
use itertools::Itertools;
use log::{info, trace};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimise,
    Maximise,
}

/// Right-hand side of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Fixed(f64),
    Upper(f64),
    Lower(f64),
}

impl Bound {
    pub fn admits(&self, value: f64) -> bool {
        const EPS: f64 = 1e-9;
        match *self {
            Bound::Fixed(rhs) => (value - rhs).abs() <= EPS,
            Bound::Upper(rhs) => value <= rhs + EPS,
            Bound::Lower(rhs) => value >= rhs - EPS,
        }
    }
}

/// `sum(coef * x[var]) <bound>`, terms indexed into the variable registry.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(usize, f64)>,
    pub bound: Bound,
}

#[derive(Debug, Clone)]
pub struct Model {
    sense: Sense,
    keys: Vec<PairKey>,
    index: HashMap<PairKey, usize>,
    costs: Vec<f64>,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl Model {
    /// Builds variables room-major, then by ascending resident indices.
    pub fn build(
        residents: &[Resident],
        rooms: &[Room],
        candidates: &[PairCandidate],
        pairing: &PairingSettings,
    ) -> Self {
        let candidates: Vec<&PairCandidate> =
            candidates.iter().sorted_by_key(|c| (c.a, c.b)).collect();
        // strict: minimise total cost. best effort: each unpaired resident
        // costs `penalty`, so a selected pair saves 2 * penalty - cost and the
        // model maximises total savings.
        let sense = match pairing.mode {
            PairingMode::Strict => Sense::Minimise,
            PairingMode::BestEffort => Sense::Maximise,
        };
        let mut model = Model {
            sense,
            keys: Vec::new(),
            index: HashMap::new(),
            costs: Vec::new(),
            objective: Vec::new(),
            constraints: Vec::new(),
        };

        let mut per_resident: Vec<Vec<usize>> = vec![Vec::new(); residents.len()];
        let mut per_room: Vec<(usize, Vec<usize>)> = Vec::new();
        for (room_idx, room) in rooms.iter().enumerate() {
            if room.capacity < 2 {
                trace!(
                    "Room '{}' (capacity {}) cannot hold a pair, skipping.",
                    room.label,
                    room.capacity
                );
                continue;
            }
            let mut in_room = Vec::with_capacity(candidates.len());
            for candidate in &candidates {
                let key = PairKey::new(candidate.a, candidate.b, room_idx);
                if model.index.contains_key(&key) {
                    continue;
                }
                let var = model.keys.len();
                model.keys.push(key);
                model.index.insert(key, var);
                model.costs.push(candidate.cost);
                model.objective.push(match sense {
                    Sense::Minimise => candidate.cost,
                    Sense::Maximise => 2.0 * pairing.unassigned_penalty - candidate.cost,
                });
                in_room.push(var);
                if let Some(list) = per_resident.get_mut(key.a) {
                    list.push(var);
                }
                if let Some(list) = per_resident.get_mut(key.b) {
                    list.push(var);
                }
            }
            per_room.push((room_idx, in_room));
        }

        let resident_bound = match pairing.mode {
            PairingMode::Strict => Bound::Fixed(1.0),
            PairingMode::BestEffort => Bound::Upper(1.0),
        };
        for (resident, vars) in residents.iter().zip(per_resident) {
            model.constraints.push(LinearConstraint {
                name: format!("resident[{}]:{}", resident.index, resident.name),
                terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
                bound: resident_bound,
            });
        }

        for (room_idx, vars) in per_room {
            let room = &rooms[room_idx];
            model.constraints.push(LinearConstraint {
                name: format!("room[{room_idx}]:{}", room.label),
                terms: vars.into_iter().map(|v| (v, 2.0)).collect(),
                bound: Bound::Upper(f64::from(room.capacity)),
            });
        }

        info!(
            "Built model with {} variables (theoretical maximum {}) and {} constraints.",
            model.keys.len(),
            residents.len() * residents.len().saturating_sub(1) / 2 * rooms.len(),
            model.constraints.len()
        );
        model
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn num_variables(&self) -> usize {
        self.keys.len()
    }

    /// Variable keys in generation order.
    pub fn keys(&self) -> &[PairKey] {
        &self.keys
    }

    pub fn variable(&self, key: &PairKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Compatibility cost of the pair behind a variable.
    pub fn pair_cost(&self, var: usize) -> f64 {
        self.costs[var]
    }

    /// Objective coefficient per variable, in registry order.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// First constraint the given variable values break, if any.
    pub fn violated_by(&self, values: &[f64]) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|row| {
            let lhs: f64 = row
                .terms
                .iter()
                .map(|(var, coef)| coef * values.get(*var).copied().unwrap_or(0.0))
                .sum();
            !row.bound.admits(lhs)
        })
    }
}
