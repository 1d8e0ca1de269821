//! Source taxonomy for trigger statements.
//!
//! Defines the canonical list of measurement sources a trigger can read
//! from, with their display labels and the sub-measurements each one
//! offers. This is the single source of truth for sub-measurement keys:
//! all other modules should look them up here rather than hardcoding them.

use crate::model::SourceKind;

// ---------------------------------------------------------------------------
// Taxonomy entries
// ---------------------------------------------------------------------------

/// Metadata for a single source kind.
#[derive(Debug, PartialEq)]
pub struct SourceEntry {
    pub kind: SourceKind,
    /// Provider-facing name of the source.
    pub label: &'static str,
    /// Quantity and unit, e.g. "Rainfall (mm)".
    pub unit_label: &'static str,
    /// Label of the sub-measurement selector for this source.
    pub sub_measurement_label: &'static str,
    /// Valid sub-measurement keys, in selector order. Never empty.
    pub sub_measurements: &'static [&'static str],
}

impl SourceEntry {
    pub fn has_sub_measurement(&self, key: &str) -> bool {
        self.sub_measurements.contains(&key)
    }

    /// Text shown for this source in the source selector.
    pub fn option_label(&self) -> String {
        format!("{} - {}", self.label, self.unit_label)
    }
}

/// One entry per source kind, in selector order.
///
/// Sources:
///   - Water level and rainfall: DHM gauge and rain-gauge network
///   - Discharge: GFH forecast
///   - Flood probability: GloFAS return-period exceedance
pub static SOURCE_REGISTRY: &[SourceEntry] = &[
    SourceEntry {
        kind: SourceKind::WaterLevel,
        label: "DHM Water Level",
        unit_label: "Water Level (m)",
        sub_measurement_label: "Level Type",
        sub_measurements: &["warning_level", "danger_level"],
    },
    SourceEntry {
        kind: SourceKind::Discharge,
        label: "GFH",
        unit_label: "Discharge (m³/s)",
        sub_measurement_label: "Discharge Type",
        sub_measurements: &["warning_discharge", "danger_discharge"],
    },
    SourceEntry {
        kind: SourceKind::Rainfall,
        label: "DHM Rainfall",
        unit_label: "Rainfall (mm)",
        sub_measurement_label: "Measurement Period",
        sub_measurements: &["hourly", "daily"],
    },
    SourceEntry {
        kind: SourceKind::FloodProbability,
        label: "Glofas",
        unit_label: "Flood Probability",
        sub_measurement_label: "Probability Period",
        sub_measurements: &["2_years_max_prob", "5_years_max_prob", "20_years_max_prob"],
    },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Looks up the taxonomy entry for a source. Returns `None` when no source
/// is chosen; a chosen source always has an entry.
pub fn lookup(kind: Option<SourceKind>) -> Option<&'static SourceEntry> {
    let kind = kind?;
    SOURCE_REGISTRY.iter().find(|entry| entry.kind == kind)
}

/// Returns every source kind in the registry, in selector order.
pub fn all_source_kinds() -> Vec<SourceKind> {
    SOURCE_REGISTRY.iter().map(|entry| entry.kind).collect()
}

/// Checks whether `key` is a valid sub-measurement of `kind`.
pub fn source_has_sub_measurement(kind: SourceKind, key: &str) -> bool {
    lookup(Some(kind))
        .map(|entry| entry.has_sub_measurement(key))
        .unwrap_or(false)
}

/// Selector text for a source, e.g. "DHM Rainfall - Rainfall (mm)".
pub fn option_label(kind: SourceKind) -> Option<String> {
    lookup(Some(kind)).map(SourceEntry::option_label)
}

/// Display form of a sub-measurement key: underscores become spaces and
/// each word is capitalised ("warning_level" → "Warning Level").
pub fn humanize_sub_measurement(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
