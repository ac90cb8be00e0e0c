//! Turns raw survey answers into numeric attribute vectors.
//!
//! Each answer is typed up front as numeric, a literal label, or missing.
//! Labels go through the category's ordinal mapping. Anything that cannot be
//! resolved is handled by the configured [`FallbackPolicy`]: lenient mode
//! substitutes a neutral code and records a warning, strict mode rejects.

use crate::config::{FallbackPolicy, NormalizationSettings};
use crate::data::{Category, Cell, Resident};
use crate::error::{AssignError, Result};
use log::{debug, warn};

/// One raw answer, before any mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAnswer {
    Numeric(f64),
    Label(String),
    Missing,
}

impl From<&Cell> for RawAnswer {
    fn from(cell: &Cell) -> Self {
        if let Some(n) = cell.number() {
            return RawAnswer::Numeric(n);
        }
        match cell.text() {
            // "nan" and friends parse as non-finite floats; treat them as blanks
            Some(text) if text.parse::<f64>().is_ok() => RawAnswer::Missing,
            Some(text) => RawAnswer::Label(text),
            None => RawAnswer::Missing,
        }
    }
}

/// A resident as read from the preferences table, answers in category order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResident {
    pub name: String,
    pub gender: String,
    pub answers: Vec<RawAnswer>,
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub residents: Vec<Resident>,
    pub warnings: Vec<String>,
}

pub fn normalize(
    raw: &[RawResident],
    categories: &[Category],
    settings: &NormalizationSettings,
) -> Result<Normalized> {
    let mut out = Normalized::default();

    for (index, resident) in raw.iter().enumerate() {
        let mut attributes = Vec::with_capacity(categories.len());
        for (k, category) in categories.iter().enumerate() {
            let answer = resident.answers.get(k).unwrap_or(&RawAnswer::Missing);
            let code = resolve(answer, category, &resident.name, settings, &mut out.warnings)?;
            attributes.push(code);
        }
        out.residents.push(Resident {
            index,
            name: resident.name.clone(),
            gender: resident.gender.clone(),
            attributes,
        });
    }

    debug!(
        "Normalized {} residents over {} categories ({} fallbacks).",
        out.residents.len(),
        categories.len(),
        out.warnings.len()
    );
    Ok(out)
}

fn resolve(
    answer: &RawAnswer,
    category: &Category,
    resident: &str,
    settings: &NormalizationSettings,
    warnings: &mut Vec<String>,
) -> Result<f64> {
    let (value, fallback) = match answer {
        RawAnswer::Numeric(n) => return Ok(*n),
        RawAnswer::Label(label) => match category.code_for(label) {
            Some(code) => return Ok(code),
            None => (label.as_str(), settings.neutral_code),
        },
        RawAnswer::Missing => ("", category.middle_code().unwrap_or(settings.neutral_code)),
    };

    match settings.policy {
        FallbackPolicy::Strict => Err(AssignError::UnmappedValue {
            resident: resident.to_string(),
            category: category.name.clone(),
            value: value.to_string(),
        }),
        FallbackPolicy::Lenient => {
            let message = if value.is_empty() {
                format!(
                    "{resident}: no answer for '{}', using code {fallback}",
                    category.name
                )
            } else {
                format!(
                    "{resident}: unmapped answer '{value}' for '{}', using code {fallback}",
                    category.name
                )
            };
            warn!("{message}");
            warnings.push(message);
            Ok(fallback)
        }
    }
}
