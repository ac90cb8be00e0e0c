use crate::config::{FallbackPolicy, NormalizationSettings};
use crate::data::{Category, Room, Table};
use crate::error::{AssignError, Result};
use crate::normalize::{RawAnswer, RawResident};
use log::{debug, warn};
use std::collections::HashSet;

const CODE_COLUMNS: [(&str, u8); 4] = [("1", 1), ("2", 2), ("3", 3), ("4", 4)];

fn require(table: &Table, name: &'static str, column: &str) -> Result<usize> {
    table
        .column(column)
        .ok_or_else(|| AssignError::table(name, format!("missing '{column}' column")))
}

/// Reads categories, weights and ordinal labels from the key table.
///
/// Rows lacking either `Category` or `Weighting` are ignored. Category order
/// follows row order and is the attribute order for every resident.
pub fn parse_key(
    key: &Table,
    settings: &NormalizationSettings,
) -> Result<(Vec<Category>, Vec<String>)> {
    let name_col = require(key, "key", "Category")?;
    let weight_col = require(key, "key", "Weighting")?;
    let code_cols: Vec<(usize, u8)> = CODE_COLUMNS
        .iter()
        .filter_map(|(column, code)| key.column(column).map(|idx| (idx, *code)))
        .collect();

    let mut categories: Vec<Category> = Vec::new();
    let mut warnings = Vec::new();
    for row in 0..key.rows.len() {
        let weight_cell = key.cell(row, weight_col);
        let Some(name) = key.cell(row, name_col).text() else {
            continue;
        };
        if weight_cell.is_blank() {
            debug!("Ignoring key row {row} ('{name}') without a weighting.");
            continue;
        }
        let weight = match (weight_cell.number(), settings.policy) {
            (Some(w), _) => w,
            (None, FallbackPolicy::Strict) => {
                return Err(AssignError::InvalidWeight {
                    category: name,
                    value: weight_cell.text().unwrap_or_default(),
                });
            }
            (None, FallbackPolicy::Lenient) => {
                let message = format!(
                    "category '{name}' has non-numeric weighting '{}', ignoring it",
                    weight_cell.text().unwrap_or_default()
                );
                warn!("{message}");
                warnings.push(message);
                continue;
            }
        };
        if weight < 0.0 {
            return Err(AssignError::table(
                "key",
                format!("category '{name}' has negative weighting {weight}"),
            ));
        }
        if categories.iter().any(|c| c.name == name) {
            return Err(AssignError::table("key", format!("duplicate category '{name}'")));
        }

        let labels = code_cols
            .iter()
            .filter_map(|(col, code)| key.cell(row, *col).text().map(|label| (label, *code)))
            .collect();
        categories.push(Category {
            name,
            weight,
            labels,
        });
    }

    Ok((categories, warnings))
}

/// Reads rooms; the first column holds the room label.
pub fn parse_rooms(rooms: &Table) -> Result<Vec<Room>> {
    let capacity_col = require(rooms, "rooms", "Capacity")?;
    if capacity_col == 0 {
        return Err(AssignError::table(
            "rooms",
            "first column must hold the room label",
        ));
    }

    let mut out = Vec::with_capacity(rooms.rows.len());
    for row in 0..rooms.rows.len() {
        let Some(label) = rooms.cell(row, 0).text() else {
            if rooms.cell(row, capacity_col).is_blank() {
                continue;
            }
            return Err(AssignError::table("rooms", format!("row {row} has no room label")));
        };
        let capacity = rooms.cell(row, capacity_col).number().ok_or_else(|| {
            AssignError::table("rooms", format!("room '{label}' has no numeric capacity"))
        })?;
        if capacity < 0.0 || capacity.fract() != 0.0 || capacity > f64::from(u32::MAX) {
            return Err(AssignError::table(
                "rooms",
                format!("room '{label}' capacity {capacity} is not a non-negative integer"),
            ));
        }
        out.push(Room {
            label,
            capacity: capacity as u32,
        });
    }
    Ok(out)
}

/// Reads residents and their raw answers, aligned to `categories`.
pub fn parse_preferences(preferences: &Table, categories: &[Category]) -> Result<Vec<RawResident>> {
    let name_col = require(preferences, "preferences", "Name")?;
    let gender_col = require(preferences, "preferences", "Gender")?;

    let category_cols: Vec<Option<usize>> = categories
        .iter()
        .map(|c| {
            let col = preferences.column(&c.name);
            if col.is_none() {
                warn!("Preferences table has no column for category '{}'.", c.name);
            }
            col
        })
        .collect();

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(preferences.rows.len());
    for (row, cells) in preferences.rows.iter().enumerate() {
        if cells.iter().all(|c| c.is_blank()) {
            continue;
        }
        let name = preferences.cell(row, name_col).text();
        let gender = preferences.cell(row, gender_col).text();
        let (Some(name), Some(gender)) = (name, gender) else {
            return Err(AssignError::table(
                "preferences",
                format!("row {row} is missing 'Name' or 'Gender'"),
            ));
        };
        if !seen.insert(name.clone()) {
            warn!("Resident name '{name}' appears more than once.");
        }
        let answers = category_cols
            .iter()
            .map(|col| match col {
                Some(col) => RawAnswer::from(preferences.cell(row, *col)),
                None => RawAnswer::Missing,
            })
            .collect();
        out.push(RawResident {
            name,
            gender,
            answers,
        });
    }
    Ok(out)
}
