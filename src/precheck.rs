use crate::config::PairingMode;
use crate::data::{Resident, Room};
use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    NoCandidate,
    OddHeadcount,
    InsufficientCapacity,
}

/// A structural reason why no complete pairing can exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub residents: Vec<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Finds residents and groups that make a strict pairing impossible.
///
/// Best effort mode only reports residents without any possible partner.
pub fn precheck(residents: &[Resident], rooms: &[Room], mode: PairingMode) -> Vec<Diagnostic> {
    let groups = residents
        .iter()
        .map(|r| (r.gender.as_str(), r))
        .into_group_map();
    let mut diagnostics = Vec::new();

    for (gender, members) in groups.iter().sorted_by_key(|(g, _)| **g) {
        match members.len() {
            1 => diagnostics.push(Diagnostic {
                kind: DiagnosticKind::NoCandidate,
                message: format!(
                    "{} is the only resident with gender '{gender}' and has no possible roommate",
                    members[0].name
                ),
                residents: vec![members[0].name.clone()],
            }),
            n if n % 2 == 1 && mode == PairingMode::Strict => diagnostics.push(Diagnostic {
                kind: DiagnosticKind::OddHeadcount,
                message: format!("{n} residents with gender '{gender}' cannot all be paired"),
                residents: members.iter().map(|r| r.name.clone()).collect(),
            }),
            _ => {}
        }
    }

    if mode == PairingMode::Strict {
        let pairs_needed: usize = groups.values().map(|m| m.len() / 2).sum();
        let pair_slots: usize = rooms.iter().map(|r| r.capacity as usize / 2).sum();
        if pair_slots < pairs_needed {
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::InsufficientCapacity,
                message: format!(
                    "rooms hold {pair_slots} pairs but {pairs_needed} pairs are needed"
                ),
                residents: Vec::new(),
            });
        }
    }

    for d in &diagnostics {
        warn!("Pre-check: {d}");
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residents(genders: &[&str]) -> Vec<Resident> {
        genders
            .iter()
            .enumerate()
            .map(|(index, g)| Resident {
                index,
                name: format!("r{index}"),
                gender: g.to_string(),
                attributes: vec![],
            })
            .collect()
    }

    fn room(capacity: u32) -> Room {
        Room {
            label: "R".into(),
            capacity,
        }
    }

    #[test]
    fn balanced_roster_is_clean() {
        let roster = residents(&["M", "M", "F", "F"]);
        let found = precheck(&roster, &[room(2), room(2)], PairingMode::Strict);
        assert!(found.is_empty());
    }

    #[test]
    fn lone_gender_is_named() {
        let found = precheck(&residents(&["M", "M", "X"]), &[room(4)], PairingMode::BestEffort);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiagnosticKind::NoCandidate);
        assert_eq!(found[0].residents, vec!["r2".to_string()]);
    }

    #[test]
    fn odd_group_only_matters_when_strict() {
        let roster = residents(&["F", "F", "F"]);
        let strict = precheck(&roster, &[room(2)], PairingMode::Strict);
        assert_eq!(strict[0].kind, DiagnosticKind::OddHeadcount);
        assert_eq!(strict[0].residents.len(), 3);
        assert!(precheck(&roster, &[room(2)], PairingMode::BestEffort).is_empty());
    }

    #[test]
    fn capacity_counts_whole_pairs() {
        let roster = residents(&["F", "F", "F", "F"]);
        let found = precheck(&roster, &[room(3)], PairingMode::Strict);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiagnosticKind::InsufficientCapacity);
        assert!(precheck(&roster, &[room(3), room(2)], PairingMode::Strict).is_empty());
    }
}
