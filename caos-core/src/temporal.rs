//! Temporal consistency between parent and child entities.
//!
//! Golden rule: a child cannot exist before its parent. Silver rule: a child
//! cannot outlive the container it exists in.

use serde_json::Value;
use thiserror::Error;

use crate::entities::{metadata::Metadata, world::World};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TemporalConsistencyError(String);

impl TemporalConsistencyError {
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A named carrier of chronology metadata. Both live entities and raw
/// proposal payloads validate through the same view.
#[derive(Debug, Clone, Copy)]
pub struct ChronoSubject<'a> {
    pub name: &'a str,
    pub metadata: &'a Metadata,
}

impl<'a> From<&'a World> for ChronoSubject<'a> {
    fn from(world: &'a World) -> Self {
        Self {
            name: &world.name,
            metadata: &world.metadata,
        }
    }
}

enum Year {
    Absent,
    Value(i64),
    Unparseable,
}

fn coerce_year(value: Option<&Value>) -> Year {
    match value {
        None | Some(Value::Null) => Year::Absent,
        Some(Value::Number(n)) => n.as_i64().map(Year::Value).unwrap_or(Year::Unparseable),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Year::Value)
            .unwrap_or(Year::Unparseable),
        Some(_) => Year::Unparseable,
    }
}

/// Checks that the child's chronology is contained in the parent's range.
///
/// Missing chronology on either side means under-specification and passes;
/// so do years that fail to coerce to integers.
pub fn validate_consistency(
    child: ChronoSubject<'_>,
    parent: ChronoSubject<'_>,
) -> Result<(), TemporalConsistencyError> {
    if child.metadata.get("chronology").is_none() || parent.metadata.get("chronology").is_none() {
        return Ok(());
    }

    let years = [
        coerce_year(child.metadata.chronology_year("start_year")),
        coerce_year(child.metadata.chronology_year("end_year")),
        coerce_year(parent.metadata.chronology_year("start_year")),
        coerce_year(parent.metadata.chronology_year("end_year")),
    ];
    if years.iter().any(|y| matches!(y, Year::Unparseable)) {
        return Ok(());
    }
    let year = |i: usize| match years[i] {
        Year::Value(y) => Some(y),
        _ => None,
    };
    let (c_start, c_end, p_start, p_end) = (year(0), year(1), year(2), year(3));

    // Regla 1: principio de causalidad.
    if let (Some(c_start), Some(p_start)) = (c_start, p_start) {
        if c_start < p_start {
            return Err(TemporalConsistencyError(format!(
                "Paradoja de Causalidad: La entidad '{}' (Año {c_start}) \
                 no puede nacer antes que su padre '{}' (Año {p_start}).",
                child.name, parent.name
            )));
        }
    }

    // Regla 2: principio de existencia.
    if let (Some(c_start), Some(p_end)) = (c_start, p_end) {
        if c_start > p_end {
            return Err(TemporalConsistencyError(format!(
                "Paradoja Temporal: La entidad '{}' (Año {c_start}) \
                 nace después del fin de su padre '{}' (Año {p_end}).",
                child.name, parent.name
            )));
        }
    }

    // Regla 3: contención de vida.
    if let (Some(c_end), Some(p_end)) = (c_end, p_end) {
        if c_end > p_end {
            return Err(TemporalConsistencyError(format!(
                "Paradoja Temporal: La entidad '{}' termina en {c_end}, \
                 posterior al fin de su contenedor '{}' ({p_end}).",
                child.name, parent.name
            )));
        }
    }

    // Regla 4: coherencia interna.
    if let (Some(c_start), Some(c_end)) = (c_start, c_end) {
        if c_start > c_end {
            return Err(TemporalConsistencyError(format!(
                "Incoherencia Temporal: '{}' nace en {c_start} pero muere antes, en {c_end}.",
                child.name
            )));
        }
    }

    Ok(())
}
