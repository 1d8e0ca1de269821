//! Progressive disclosure and submittability.
//!
//! Each step of the source chain is only shown once its parent resolves:
//!
//!   source set → sub-measurement step
//!   sub-measurement valid → operator and value step
//!   operator set and value finite → expression preview
//!
//! A draft is submittable when the chain reaches the preview and every
//! required text field is non-empty.

use crate::model::{DraftField, TriggerDraft};
use crate::sources;

/// Which dependent steps of the builder are currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    pub show_sub_measurement_step: bool,
    pub show_operator_and_value_step: bool,
    pub show_expression_preview: bool,
}

/// Required free-text fields, in form order.
pub const REQUIRED_TEXT_FIELDS: [DraftField; 6] = [
    DraftField::Phase,
    DraftField::RiverBasin,
    DraftField::Title,
    DraftField::Description,
    DraftField::RepeatKey,
    DraftField::RepeatEvery,
];

/// Parses a threshold value, accepting only finite numbers.
pub fn parse_value(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn visibility(draft: &TriggerDraft) -> Visibility {
    let show_sub_measurement_step = sources::lookup(draft.source).is_some();

    let show_operator_and_value_step = show_sub_measurement_step
        && !draft.sub_measurement.is_empty()
        && sources::lookup(draft.source)
            .map(|entry| entry.has_sub_measurement(&draft.sub_measurement))
            .unwrap_or(false);

    let show_expression_preview = show_operator_and_value_step
        && draft.operator.is_some()
        && parse_value(&draft.value).is_some();

    Visibility {
        show_sub_measurement_step,
        show_operator_and_value_step,
        show_expression_preview,
    }
}

fn text_field(draft: &TriggerDraft, field: DraftField) -> &str {
    match field {
        DraftField::Phase => draft.phase.as_str(),
        DraftField::RiverBasin => draft.river_basin.as_str(),
        DraftField::Title => draft.title.as_str(),
        DraftField::Description => draft.description.as_str(),
        DraftField::RepeatKey => draft.repeat_key.as_str(),
        DraftField::RepeatEvery => draft.repeat_every.as_str(),
        DraftField::SubMeasurement => draft.sub_measurement.as_str(),
        DraftField::Value => draft.value.as_str(),
        DraftField::Notes => draft.notes.as_str(),
        _ => "",
    }
}

/// Fields still blocking submission, in form order.
///
/// Source-chain fields are reported from the first unresolved step only,
/// since later steps are hidden until it resolves.
pub fn missing_requirements(draft: &TriggerDraft) -> Vec<DraftField> {
    let mut missing: Vec<DraftField> = REQUIRED_TEXT_FIELDS
        .into_iter()
        .filter(|field| text_field(draft, *field).is_empty())
        .collect();

    let vis = visibility(draft);
    if !vis.show_sub_measurement_step {
        missing.push(DraftField::Source);
    } else if !vis.show_operator_and_value_step {
        missing.push(DraftField::SubMeasurement);
    } else if !vis.show_expression_preview {
        if draft.operator.is_none() {
            missing.push(DraftField::Operator);
        }
        if parse_value(&draft.value).is_none() {
            missing.push(DraftField::Value);
        }
    }
    missing
}

pub fn is_submittable(draft: &TriggerDraft) -> bool {
    REQUIRED_TEXT_FIELDS
        .iter()
        .all(|field| !text_field(draft, *field).is_empty())
        && visibility(draft).show_expression_preview
}

/// Expression preview text, present only while the preview step is shown.
/// Identical to the expression the canonicalizer submits.
pub fn preview_expression(draft: &TriggerDraft) -> Option<String> {
    if !visibility(draft).show_expression_preview {
        return None;
    }
    let operator = draft.operator?;
    Some(format!(
        "{} {} {}",
        draft.sub_measurement,
        operator.symbol(),
        draft.value
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldChange, Operator, SourceKind};

    fn complete_draft() -> TriggerDraft {
        TriggerDraft::empty()
            .apply(FieldChange::Phase("READINESS".into()))
            .apply(FieldChange::RiverBasin("Doda river at east-west highway".into()))
            .apply(FieldChange::Title("Doda warning level".into()))
            .apply(FieldChange::Description("Water above warning level".into()))
            .apply(FieldChange::RepeatKey("daily".into()))
            .apply(FieldChange::RepeatEvery("1".into()))
            .apply(FieldChange::Source(Some(SourceKind::WaterLevel)))
            .apply(FieldChange::SubMeasurement("warning_level".into()))
            .apply(FieldChange::Operator(Some(Operator::Gt)))
            .apply(FieldChange::Value("5".into()))
    }

    #[test]
    fn test_empty_draft_shows_nothing() {
        let draft = TriggerDraft::empty();
        assert_eq!(visibility(&draft), Visibility::default());
        assert!(!is_submittable(&draft));
        assert_eq!(preview_expression(&draft), None);
    }

    #[test]
    fn test_steps_open_in_order() {
        let draft = TriggerDraft::empty().apply(FieldChange::Source(Some(SourceKind::Rainfall)));
        let vis = visibility(&draft);
        assert!(vis.show_sub_measurement_step);
        assert!(!vis.show_operator_and_value_step);
        assert!(!vis.show_expression_preview);

        let draft = draft.apply(FieldChange::SubMeasurement("daily".into()));
        assert!(visibility(&draft).show_operator_and_value_step);
        assert!(!visibility(&draft).show_expression_preview);

        let draft = draft.apply(FieldChange::Operator(Some(Operator::Lt)));
        assert!(!visibility(&draft).show_expression_preview);

        let draft = draft.apply(FieldChange::Value("100".into()));
        assert!(visibility(&draft).show_expression_preview);
    }

    #[test]
    fn test_complete_draft_is_submittable() {
        let draft = complete_draft();
        assert!(is_submittable(&draft));
        assert!(missing_requirements(&draft).is_empty());
        assert_eq!(preview_expression(&draft).as_deref(), Some("warning_level > 5"));
    }

    #[test]
    fn test_each_missing_text_field_blocks_submission() {
        for field in REQUIRED_TEXT_FIELDS {
            let mut draft = complete_draft();
            match field {
                DraftField::Phase => draft.phase.clear(),
                DraftField::RiverBasin => draft.river_basin.clear(),
                DraftField::Title => draft.title.clear(),
                DraftField::Description => draft.description.clear(),
                DraftField::RepeatKey => draft.repeat_key.clear(),
                DraftField::RepeatEvery => draft.repeat_every.clear(),
                _ => unreachable!(),
            }
            assert!(!is_submittable(&draft), "{} should be required", field);
            assert_eq!(missing_requirements(&draft), vec![field]);
        }
    }

    #[test]
    fn test_each_missing_chain_step_blocks_submission() {
        let mut no_source = complete_draft();
        no_source.source = None;
        assert!(!is_submittable(&no_source));
        assert_eq!(missing_requirements(&no_source), vec![DraftField::Source]);

        let no_sub = complete_draft().apply(FieldChange::SubMeasurement(String::new()));
        assert!(!is_submittable(&no_sub));
        assert_eq!(missing_requirements(&no_sub), vec![DraftField::SubMeasurement]);

        let no_operator = complete_draft().apply(FieldChange::Operator(None));
        assert!(!is_submittable(&no_operator));
        assert_eq!(missing_requirements(&no_operator), vec![DraftField::Operator]);

        let no_value = complete_draft().apply(FieldChange::Value(String::new()));
        assert!(!is_submittable(&no_value));
        assert_eq!(missing_requirements(&no_value), vec![DraftField::Value]);
    }

    #[test]
    fn test_non_numeric_and_non_finite_values_are_rejected() {
        for bad in ["abc", "5m", "", "NaN", "inf", "-infinity", " 5"] {
            let draft = complete_draft().apply(FieldChange::Value(bad.into()));
            assert!(!visibility(&draft).show_expression_preview, "'{}' accepted", bad);
            assert!(!is_submittable(&draft));
        }
        for good in ["0", "-2.5", "0.01", "1e3"] {
            let draft = complete_draft().apply(FieldChange::Value(good.into()));
            assert!(is_submittable(&draft), "'{}' rejected", good);
        }
    }

    #[test]
    fn test_sub_measurement_from_other_source_hides_operator_step() {
        // Bypasses `apply` to model a draft built by hand.
        let mut draft = complete_draft();
        draft.sub_measurement = "daily".into();
        assert!(!visibility(&draft).show_operator_and_value_step);
        assert!(!is_submittable(&draft));
    }

    #[test]
    fn test_notes_are_optional() {
        let draft = complete_draft();
        assert!(draft.notes.is_empty());
        assert!(is_submittable(&draft));
    }
}
