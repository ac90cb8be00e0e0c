use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type ResidentIdx = usize;
pub type RoomIdx = usize;

/// A single cell of an input table. Numbers, strings and nulls are all accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Trimmed text of the cell; `None` for nulls and blank strings.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Numeric value of the cell, parsing text when needed. NaN counts as missing.
    pub fn number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_none()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Tabular records with named columns, in column order.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_row<C: Into<Cell>>(mut self, row: impl IntoIterator<Item = C>) -> Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Cell at (row, column); short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// The three tables a pairing request is made of.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignmentInput {
    pub preferences: Table,
    pub rooms: Table,
    pub key: Table,
}

/// A weighted preference category with its ordinal label mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub weight: f64,
    /// (label, code) pairs, codes in 1..=4.
    pub labels: Vec<(String, u8)>,
}

impl Category {
    pub fn code_for(&self, label: &str) -> Option<f64> {
        let label = label.trim();
        self.labels
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, code)| f64::from(*code))
    }

    /// Lower middle of the mapped codes, used for missing answers.
    pub fn middle_code(&self) -> Option<f64> {
        let mut codes: Vec<u8> = self.labels.iter().map(|(_, c)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        if codes.is_empty() {
            return None;
        }
        Some(f64::from(codes[(codes.len() - 1) / 2]))
    }
}

/// A resident with an attribute vector aligned to the category list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resident {
    pub index: ResidentIdx,
    pub name: String,
    pub gender: String,
    pub attributes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub label: String,
    pub capacity: u32,
}

/// Identity of a decision variable: an unordered resident pair in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub a: ResidentIdx,
    pub b: ResidentIdx,
    pub room: RoomIdx,
}

impl PairKey {
    pub fn new(x: ResidentIdx, y: ResidentIdx, room: RoomIdx) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self { a, b, room }
    }

    pub fn contains(&self, resident: ResidentIdx) -> bool {
        self.a == resident || self.b == resident
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x[{},{},{}]", self.a, self.b, self.room)
    }
}

/// Two same-gender residents (a < b) and their compatibility cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCandidate {
    pub a: ResidentIdx,
    pub b: ResidentIdx,
    pub cost: f64,
}

/// A resolved pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub resident_a: String,
    pub resident_b: String,
    pub room: String,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {} -> {}", self.resident_a, self.resident_b, self.room)
    }
}

/// The final output of the pairing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReport {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<String>,
    pub total_cost: f64,
    pub warnings: Vec<String>,
}
