use crate::backend::Solution;
use crate::data::{Assignment, AssignmentReport, Resident, Room};
use crate::error::{AssignError, Result};
use crate::model::Model;
use std::fmt::Write as _;

pub const CSV_HEADER: &str = "Roommate A,Roommate B,Room";
pub const UNPAIRED: &str = "Unpaired";

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<String>,
    pub total_cost: f64,
}

/// Reads accepted pairs back out of a solution, in variable generation order.
pub fn decode(
    model: &Model,
    solution: &Solution,
    residents: &[Resident],
    rooms: &[Room],
) -> Result<Decoded> {
    if solution.len() != model.num_variables() {
        return Err(AssignError::Solver(format!(
            "solution has {} values for {} variables",
            solution.len(),
            model.num_variables()
        )));
    }

    let mut paired = vec![false; residents.len()];
    let mut assignments = Vec::new();
    let mut total_cost = 0.0;
    for (var, key) in model.keys().iter().enumerate() {
        if !solution.is_selected(var) {
            continue;
        }
        for idx in [key.a, key.b] {
            if std::mem::replace(&mut paired[idx], true) {
                return Err(AssignError::Solver(format!(
                    "resident '{}' was placed in more than one pair",
                    residents[idx].name
                )));
            }
        }
        total_cost += model.pair_cost(var);
        assignments.push(Assignment {
            resident_a: residents[key.a].name.clone(),
            resident_b: residents[key.b].name.clone(),
            room: rooms[key.room].label.clone(),
        });
    }

    let unassigned = residents
        .iter()
        .filter(|r| !paired[r.index])
        .map(|r| r.name.clone())
        .collect();

    Ok(Decoded {
        assignments,
        unassigned,
        total_cost,
    })
}

/// Renders the two-section result table: pairs, then unpaired residents.
pub fn render_csv(report: &AssignmentReport) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for a in &report.assignments {
        let _ = writeln!(
            out,
            "{},{},{}",
            csv_field(&a.resident_a),
            csv_field(&a.resident_b),
            csv_field(&a.room)
        );
    }
    for name in &report.unassigned {
        let _ = writeln!(out, "{},{UNPAIRED},", csv_field(name));
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
