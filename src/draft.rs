//! Draft transitions.
//!
//! Every edit goes through [`TriggerDraft::try_apply`], which enforces the
//! dependency chain source → sub-measurement → operator → value:
//!
//! - changing the source clears the three dependent fields in the same
//!   transition, whatever they held before;
//! - dependent fields cannot be edited while no source is chosen;
//! - a sub-measurement must belong to the chosen source.

use crate::model::{BuilderError, DraftField, FieldChange, TriggerDraft};
use crate::sources;

impl TriggerDraft {
    /// Applies `change` and returns the resulting draft, or
    /// `InvalidTransition` if the edit's prerequisites are unmet.
    pub fn try_apply(&self, change: FieldChange) -> Result<TriggerDraft, BuilderError> {
        let field = change.field();
        if field.is_source_dependent() {
            check_dependent_edit(self, &change)?;
        }

        let mut next = self.clone();
        match change {
            FieldChange::TriggerType(v) => next.trigger_type = v,
            FieldChange::Phase(v) => next.phase = v,
            FieldChange::RiverBasin(v) => next.river_basin = v,
            FieldChange::Title(v) => next.title = v,
            FieldChange::Description(v) => next.description = v,
            FieldChange::Source(v) => {
                // Unconditional cascade, even when re-selecting the same source.
                next.source = v;
                next.sub_measurement.clear();
                next.operator = None;
                next.value.clear();
            }
            FieldChange::SubMeasurement(v) => next.sub_measurement = v,
            FieldChange::Operator(v) => next.operator = v,
            FieldChange::Value(v) => next.value = v,
            FieldChange::RepeatKey(v) => next.repeat_key = v,
            FieldChange::RepeatEvery(v) => next.repeat_every = v,
            FieldChange::Notes(v) => next.notes = v,
            FieldChange::IsMandatory(v) => next.is_mandatory = v,
            FieldChange::IsTriggered(v) => next.is_triggered = v,
        }
        Ok(next)
    }

    /// Applies `change`, leaving the draft unchanged if the edit is rejected.
    pub fn apply(&self, change: FieldChange) -> TriggerDraft {
        self.try_apply(change).unwrap_or_else(|_| self.clone())
    }
}

fn check_dependent_edit(draft: &TriggerDraft, change: &FieldChange) -> Result<(), BuilderError> {
    let Some(entry) = sources::lookup(draft.source) else {
        return Err(BuilderError::InvalidTransition {
            field: change.field(),
            reason: "no source chosen".to_string(),
        });
    };

    if let FieldChange::SubMeasurement(key) = change {
        if !key.is_empty() && !entry.has_sub_measurement(key) {
            return Err(BuilderError::InvalidTransition {
                field: DraftField::SubMeasurement,
                reason: format!("'{}' is not a sub-measurement of {}", key, entry.kind),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
