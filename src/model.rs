//! Core data types for the trigger definition builder.
//!
//! This module defines the shared domain model imported by all other modules:
//! source kinds, comparison operators, the authoring draft, field edits and
//! the error type. It contains no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

/// The category of physical measurement a trigger condition reads from.
///
/// "No source chosen yet" is expressed as `Option<SourceKind>::None` on the
/// draft, never as a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    WaterLevel,
    Discharge,
    Rainfall,
    FloodProbability,
}

impl SourceKind {
    /// Every source kind, in selector order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::WaterLevel,
        SourceKind::Discharge,
        SourceKind::Rainfall,
        SourceKind::FloodProbability,
    ];

    /// Stable key used on the wire and in the taxonomy.
    pub fn key(self) -> &'static str {
        match self {
            SourceKind::WaterLevel => "water_level",
            SourceKind::Discharge => "discharge",
            SourceKind::Rainfall => "rainfall",
            SourceKind::FloodProbability => "flood_probability",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| BuilderError::UnknownSource(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Comparison applied between the sub-measurement and the threshold value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

impl Operator {
    /// Every operator, in selector order.
    pub const ALL: [Operator; 5] = [
        Operator::Gt,
        Operator::Lt,
        Operator::Eq,
        Operator::Gte,
        Operator::Lte,
    ];

    /// Canonical symbol written into expressions and payloads.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Eq => "=",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
        }
    }

    /// Label shown in the operator selector.
    pub fn label(self) -> &'static str {
        match self {
            Operator::Gt => "Greater than (>)",
            Operator::Lt => "Less than (<)",
            Operator::Eq => "Equals (=)",
            Operator::Gte => "Greater than or equal (≥)",
            Operator::Lte => "Less than or equal (≤)",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| BuilderError::UnknownOperator(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Trigger type
// ---------------------------------------------------------------------------

/// Automated triggers are evaluated against incoming readings; manual ones
/// are activated by an operator. The core treats both identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Automated,
    Manual,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The partially-specified state of a trigger being authored.
///
/// Mutate it through [`TriggerDraft::apply`] (see `draft.rs`) so the
/// source → sub-measurement → operator → value chain never holds a stale
/// combination. Fields are public for reading and for building fixtures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriggerDraft {
    pub trigger_type: TriggerType,
    pub phase: String,
    pub river_basin: String,
    pub title: String,
    pub description: String,
    pub source: Option<SourceKind>,
    pub sub_measurement: String,
    pub operator: Option<Operator>,
    pub value: String,
    pub repeat_key: String,
    pub repeat_every: String,
    pub notes: String,
    pub is_mandatory: bool,
    pub is_triggered: bool,
}

impl TriggerDraft {
    /// The draft a freshly opened builder starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Names of the draft's fields, used for edits, requirement reporting and
/// log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    TriggerType,
    Phase,
    RiverBasin,
    Title,
    Description,
    Source,
    SubMeasurement,
    Operator,
    Value,
    RepeatKey,
    RepeatEvery,
    Notes,
    IsMandatory,
    IsTriggered,
}

impl DraftField {
    /// Field name as it appears in the submitted payload.
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::TriggerType => "triggerType",
            DraftField::Phase => "phase",
            DraftField::RiverBasin => "riverBasin",
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::Source => "source",
            DraftField::SubMeasurement => "subMeasurement",
            DraftField::Operator => "operator",
            DraftField::Value => "value",
            DraftField::RepeatKey => "repeatKey",
            DraftField::RepeatEvery => "repeatEvery",
            DraftField::Notes => "notes",
            DraftField::IsMandatory => "isMandatory",
            DraftField::IsTriggered => "isTriggered",
        }
    }

    /// True for the fields that depend on a chosen source.
    pub fn is_source_dependent(self) -> bool {
        matches!(
            self,
            DraftField::SubMeasurement | DraftField::Operator | DraftField::Value
        )
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named edit to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    TriggerType(TriggerType),
    Phase(String),
    RiverBasin(String),
    Title(String),
    Description(String),
    Source(Option<SourceKind>),
    SubMeasurement(String),
    Operator(Option<Operator>),
    Value(String),
    RepeatKey(String),
    RepeatEvery(String),
    Notes(String),
    IsMandatory(bool),
    IsTriggered(bool),
}

impl FieldChange {
    pub fn field(&self) -> DraftField {
        match self {
            FieldChange::TriggerType(_) => DraftField::TriggerType,
            FieldChange::Phase(_) => DraftField::Phase,
            FieldChange::RiverBasin(_) => DraftField::RiverBasin,
            FieldChange::Title(_) => DraftField::Title,
            FieldChange::Description(_) => DraftField::Description,
            FieldChange::Source(_) => DraftField::Source,
            FieldChange::SubMeasurement(_) => DraftField::SubMeasurement,
            FieldChange::Operator(_) => DraftField::Operator,
            FieldChange::Value(_) => DraftField::Value,
            FieldChange::RepeatKey(_) => DraftField::RepeatKey,
            FieldChange::RepeatEvery(_) => DraftField::RepeatEvery,
            FieldChange::Notes(_) => DraftField::Notes,
            FieldChange::IsMandatory(_) => DraftField::IsMandatory,
            FieldChange::IsTriggered(_) => DraftField::IsTriggered,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while editing, validating, canonicalizing or submitting a
/// trigger draft.
///
/// Only `SubmissionFailed` is meant for the user; the others are handled
/// locally by disabling or hiding fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuilderError {
    /// An edit to a field whose prerequisites are unmet.
    #[error("invalid transition on {field}: {reason}")]
    InvalidTransition { field: DraftField, reason: String },

    /// Submit or canonicalize attempted while required fields are missing.
    #[error("draft is not submittable, missing: {}", join_fields(.missing))]
    NotSubmittable { missing: Vec<DraftField> },

    /// The threshold value did not parse as a finite number.
    #[error("value '{0}' is not a finite number")]
    ValueFormat(String),

    /// The trigger store rejected the payload or the transport failed.
    #[error("submission failed: {}", .detail.as_deref().unwrap_or("no detail provided"))]
    SubmissionFailed { detail: Option<String> },

    #[error("unknown source kind: {0}")]
    UnknownSource(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
