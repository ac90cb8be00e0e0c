// End-to-end pairing runs against the HiGHS backend.

use roommate_solver::config::{FallbackPolicy, PairingMode, Settings};
use roommate_solver::precheck::DiagnosticKind;
use roommate_solver::{AssignError, AssignmentInput, Cell, HighsBackend, Table, solve};
use std::collections::{HashMap, HashSet};

fn key() -> Table {
    Table::new(["Category", "Weighting", "1", "2", "3", "4"])
        .with_row([
            Cell::from("cleanliness"),
            Cell::from(1.0),
            "messy".into(),
            "okay".into(),
            "tidy".into(),
            "spotless".into(),
        ])
        .with_row([
            Cell::from("comment"),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ])
}

fn preferences(people: &[(&str, &str, &str)]) -> Table {
    people.iter().fold(
        Table::new(["Name", "Gender", "cleanliness"]),
        |table, (name, gender, answer)| table.with_row([*name, *gender, *answer]),
    )
}

fn rooms(capacities: &[u32]) -> Table {
    capacities.iter().enumerate().fold(Table::new(["Room", "Capacity"]), |table, (i, c)| {
        table.with_row([Cell::Text(format!("R{}", i + 1)), Cell::Number(f64::from(*c))])
    })
}

fn input(people: &[(&str, &str, &str)], capacities: &[u32]) -> AssignmentInput {
    AssignmentInput {
        preferences: preferences(people),
        rooms: rooms(capacities),
        key: key(),
    }
}

fn settings(mode: PairingMode, precheck: bool) -> Settings {
    let mut settings = Settings::default();
    settings.pairing.mode = mode;
    settings.pairing.precheck = precheck;
    settings
}

#[test]
fn test_four_residents_two_rooms() {
    let data = input(
        &[("A", "M", "messy"), ("B", "M", "messy"), ("C", "F", "spotless"), ("D", "F", "tidy")],
        &[2, 2],
    );
    let report = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap();

    assert_eq!(report.assignments.len(), 2);
    let pairs: HashSet<(String, String)> = report
        .assignments
        .iter()
        .map(|a| (a.resident_a.clone(), a.resident_b.clone()))
        .collect();
    assert!(pairs.contains(&("A".to_string(), "B".to_string())));
    assert!(pairs.contains(&("C".to_string(), "D".to_string())));
    assert_ne!(report.assignments[0].room, report.assignments[1].room);
    assert!(report.unassigned.is_empty());
    assert_eq!(report.total_cost, 1.0);
}

#[test]
fn test_odd_headcount_is_infeasible_in_solver() {
    let data = input(&[("A", "F", "okay"), ("B", "F", "okay"), ("C", "F", "tidy")], &[2]);
    let err = solve(&data, &settings(PairingMode::Strict, false), &HighsBackend::default())
        .unwrap_err();
    assert!(matches!(err, AssignError::Infeasible { .. }), "got {err}");
    assert_eq!(err.diagnostics()[0].kind, DiagnosticKind::OddHeadcount);
}

#[test]
fn test_odd_headcount_is_caught_by_precheck() {
    let data = input(&[("A", "F", "okay"), ("B", "F", "okay"), ("C", "F", "tidy")], &[2]);
    let err = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap_err();
    assert!(matches!(err, AssignError::Infeasible { .. }));
    assert_eq!(err.diagnostics()[0].residents.len(), 3);
}

#[test]
fn test_lone_gender_is_named() {
    let data = input(&[("A", "F", "okay"), ("B", "F", "okay"), ("C", "M", "tidy")], &[4]);
    let err = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap_err();
    let lone: Vec<_> = err
        .diagnostics()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::NoCandidate)
        .collect();
    assert_eq!(lone.len(), 1);
    assert_eq!(lone[0].residents, vec!["C".to_string()]);
}

#[test]
fn test_insufficient_capacity_without_precheck() {
    let data = input(
        &[("A", "F", "okay"), ("B", "F", "okay"), ("C", "F", "tidy"), ("D", "F", "tidy")],
        &[3],
    );
    let result = solve(&data, &settings(PairingMode::Strict, false), &HighsBackend::default());
    assert!(result.is_err());
}

#[test]
fn test_finds_cheapest_matching() {
    // messy/messy, spotless/spotless and okay/tidy is the only cost-1 matching
    let data = input(
        &[
            ("A", "F", "messy"),
            ("B", "F", "spotless"),
            ("C", "F", "okay"),
            ("D", "F", "messy"),
            ("E", "F", "tidy"),
            ("F", "F", "spotless"),
        ],
        &[2, 2, 2],
    );
    let report = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap();
    assert_eq!(report.total_cost, 1.0);
    let pairs: HashSet<(String, String)> = report
        .assignments
        .iter()
        .map(|a| (a.resident_a.clone(), a.resident_b.clone()))
        .collect();
    assert!(pairs.contains(&("A".to_string(), "D".to_string())));
    assert!(pairs.contains(&("B".to_string(), "F".to_string())));
    assert!(pairs.contains(&("C".to_string(), "E".to_string())));
}

#[test]
fn test_large_rooms_hold_two_pairs() {
    let data = input(
        &[("A", "M", "okay"), ("B", "M", "okay"), ("C", "M", "tidy"), ("D", "M", "tidy")],
        &[4],
    );
    let report = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap();
    assert_eq!(report.assignments.len(), 2);
    assert!(report.assignments.iter().all(|a| a.room == "R1"));
}

#[test]
fn test_best_effort_leaves_odd_resident_out() {
    let data = input(
        &[
            ("A", "F", "messy"),
            ("B", "F", "messy"),
            ("C", "F", "spotless"),
            ("D", "F", "spotless"),
            ("E", "F", "okay"),
        ],
        &[2, 2, 2],
    );
    let best_effort = settings(PairingMode::BestEffort, true);
    let report = solve(&data, &best_effort, &HighsBackend::default()).unwrap();
    assert_eq!(report.assignments.len(), 2);
    assert_eq!(report.unassigned, vec!["E".to_string()]);
    assert_eq!(report.total_cost, 0.0);
}

#[test]
fn test_best_effort_respects_capacity() {
    let data = input(
        &[("A", "F", "okay"), ("B", "F", "okay"), ("C", "F", "tidy"), ("D", "F", "tidy")],
        &[2, 1],
    );
    let best_effort = settings(PairingMode::BestEffort, true);
    let report = solve(&data, &best_effort, &HighsBackend::default()).unwrap();
    assert_eq!(report.assignments.len(), 1);
    assert_eq!(report.assignments[0].room, "R1");
    assert_eq!(report.unassigned.len(), 2);
}

#[test]
fn test_solution_invariants_hold() {
    let people = [
        ("Ana", "F", "messy"),
        ("Ben", "M", "tidy"),
        ("Cleo", "F", "okay"),
        ("Dan", "M", "spotless"),
        ("Eli", "M", "messy"),
        ("Fay", "F", "tidy"),
        ("Gus", "M", "okay"),
        ("Hana", "F", "spotless"),
    ];
    let capacities = [4, 2, 2, 0];
    let data = input(&people, &capacities);
    let report = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap();

    let gender: HashMap<&str, &str> = people.iter().map(|(n, g, _)| (*n, *g)).collect();
    let mut seen = HashSet::new();
    let mut occupants: HashMap<String, u32> = HashMap::new();
    for a in &report.assignments {
        assert_eq!(gender[a.resident_a.as_str()], gender[a.resident_b.as_str()]);
        assert!(seen.insert(a.resident_a.clone()));
        assert!(seen.insert(a.resident_b.clone()));
        *occupants.entry(a.room.clone()).or_default() += 2;
    }
    for (i, capacity) in capacities.iter().enumerate() {
        let used = occupants.get(&format!("R{}", i + 1)).copied().unwrap_or(0);
        assert!(used <= *capacity);
    }
    assert_eq!(seen.len(), people.len());
}

#[test]
fn test_repeated_solves_are_identical() {
    let data = input(
        &[
            ("A", "F", "messy"),
            ("B", "F", "spotless"),
            ("C", "F", "okay"),
            ("D", "F", "messy"),
            ("E", "M", "tidy"),
            ("F", "M", "spotless"),
        ],
        &[2, 4, 2],
    );
    let backend = HighsBackend::default();
    let first = solve(&data, &Settings::default(), &backend).unwrap();
    let second = solve(&data, &Settings::default(), &backend).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_strict_normalization_rejects_unknown_label() {
    let data = input(&[("A", "F", "okay"), ("B", "F", "filthy")], &[2]);
    let mut settings = Settings::default();
    settings.normalization.policy = FallbackPolicy::Strict;
    let err = solve(&data, &settings, &HighsBackend::default()).unwrap_err();
    assert!(matches!(err, AssignError::UnmappedValue { .. }));

    let report = solve(&data, &Settings::default(), &HighsBackend::default()).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.total_cost, 0.0);
}
