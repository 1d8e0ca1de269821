//! Canonical expression and storage payload for a complete draft.
//!
//! The payload is the contract with the trigger store; its JSON field names
//! must not change independently of that store.

use serde::{Deserialize, Serialize, Serializer};

use crate::disclosure::{self, parse_value};
use crate::model::{BuilderError, DraftField, Operator, SourceKind, TriggerDraft};

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// The condition part of a stored trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerStatement {
    pub source: SourceKind,
    pub sub_measurement: String,
    pub operator: Operator,
    #[serde(serialize_with = "serialize_threshold")]
    pub value: f64,
    pub expression: String,
    pub river_basin: String,
    pub phase: String,
}

/// Request body sent to the trigger store's create operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
    pub repeat_key: String,
    pub repeat_every: String,
    pub trigger_statement: TriggerStatement,
    pub title: String,
    pub description: String,
    pub notes: String,
    pub is_mandatory: bool,
    pub is_triggered: bool,
    pub is_deleted: bool,
}

impl TriggerPayload {
    pub fn to_json(&self) -> serde_json::Value {
        // Plain structs of strings, bools and finite numbers always serialize.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Integral thresholds go out as JSON integers (`5`, not `5.0`). Negative
/// zero stays a float so its sign survives.
fn serialize_threshold<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    let negative_zero = *value == 0.0 && value.is_sign_negative();
    if value.fract() == 0.0 && value.abs() < MAX_EXACT && !negative_zero {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Expression plus payload derived from one submittable draft.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTrigger {
    pub expression: String,
    pub payload: TriggerPayload,
}

// ---------------------------------------------------------------------------
// Canonicalization
// ---------------------------------------------------------------------------

/// Derives the expression and payload from a submittable draft.
///
/// Callers should gate on [`disclosure::is_submittable`]. Out of contract,
/// this returns `NotSubmittable` for an unresolved chain or missing text,
/// and `ValueFormat` for a value that is not a finite number.
pub fn canonicalize(draft: &TriggerDraft) -> Result<CanonicalTrigger, BuilderError> {
    let (Some(source), Some(operator)) = (draft.source, draft.operator) else {
        return Err(not_submittable(draft));
    };
    if draft.sub_measurement.is_empty() {
        return Err(not_submittable(draft));
    }

    let value =
        parse_value(&draft.value).ok_or_else(|| BuilderError::ValueFormat(draft.value.clone()))?;

    if !disclosure::is_submittable(draft) {
        return Err(not_submittable(draft));
    }

    // The value text is used verbatim so the precision entered is preserved.
    let expression = format!(
        "{} {} {}",
        draft.sub_measurement,
        operator.symbol(),
        draft.value
    );

    let payload = TriggerPayload {
        repeat_key: draft.repeat_key.clone(),
        repeat_every: draft.repeat_every.clone(),
        trigger_statement: TriggerStatement {
            source,
            sub_measurement: draft.sub_measurement.clone(),
            operator,
            value,
            expression: expression.clone(),
            river_basin: draft.river_basin.clone(),
            phase: draft.phase.clone(),
        },
        title: draft.title.clone(),
        description: draft.description.clone(),
        notes: draft.notes.clone(),
        is_mandatory: draft.is_mandatory,
        is_triggered: draft.is_triggered,
        is_deleted: false,
    };

    Ok(CanonicalTrigger {
        expression,
        payload,
    })
}

fn not_submittable(draft: &TriggerDraft) -> BuilderError {
    let mut missing = disclosure::missing_requirements(draft);
    if missing.is_empty() {
        missing.push(DraftField::Value);
    }
    BuilderError::NotSubmittable { missing }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
