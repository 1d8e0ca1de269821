//! One authoring session for a trigger statement.
//!
//! A [`TriggerBuilder`] owns its draft and its submission pipeline; nothing
//! is shared between sessions, so any number can run side by side. Edits
//! are applied synchronously in call order, and disclosure state is always
//! computed from the current draft.

use crate::config::SubmissionConfig;
use crate::disclosure::{self, Visibility};
use crate::logging::{self, Component};
use crate::model::{BuilderError, DraftField, FieldChange, TriggerDraft};
use crate::submission::{
    PendingSubmission, StoreError, SubmissionPipeline, SubmissionState, SubmitOutcome,
    TriggerStore,
};

#[derive(Debug, Default)]
pub struct TriggerBuilder {
    draft: TriggerDraft,
    pipeline: SubmissionPipeline,
}

impl TriggerBuilder {
    /// Opens a builder with an empty draft and the default request timeout.
    pub fn open() -> Self {
        Self::with_config(&SubmissionConfig::default())
    }

    pub fn with_config(config: &SubmissionConfig) -> Self {
        Self {
            draft: TriggerDraft::empty(),
            pipeline: SubmissionPipeline::new(config.timeout()),
        }
    }

    pub fn draft(&self) -> &TriggerDraft {
        &self.draft
    }

    /// Applies one edit. Returns `false` if the edit was rejected, in which
    /// case the draft is unchanged.
    pub fn edit(&mut self, change: FieldChange) -> bool {
        let field = change.field();
        match self.draft.try_apply(change) {
            Ok(next) => {
                if field == DraftField::Source {
                    logging::debug(
                        Component::Draft,
                        Some(field),
                        "source changed, dependent fields reset",
                    );
                }
                self.draft = next;
                true
            }
            Err(err) => {
                logging::debug(Component::Draft, Some(field), &err.to_string());
                false
            }
        }
    }

    /// Discards the draft.
    pub fn clear(&mut self) {
        self.draft = TriggerDraft::empty();
    }

    pub fn visibility(&self) -> Visibility {
        disclosure::visibility(&self.draft)
    }

    pub fn is_submittable(&self) -> bool {
        disclosure::is_submittable(&self.draft)
    }

    pub fn missing_requirements(&self) -> Vec<DraftField> {
        disclosure::missing_requirements(&self.draft)
    }

    pub fn preview_expression(&self) -> Option<String> {
        disclosure::preview_expression(&self.draft)
    }

    pub fn state(&self) -> &SubmissionState {
        self.pipeline.state()
    }

    pub fn failure_detail(&self) -> Option<&str> {
        self.pipeline.failure_detail()
    }

    /// True once a submission has succeeded; the session accepts no further
    /// submissions.
    pub fn is_finished(&self) -> bool {
        self.pipeline.is_finished()
    }

    /// First half of a submission: canonicalizes the draft and enters
    /// `Submitting`. See [`SubmissionPipeline::begin`].
    pub fn begin_submit(&mut self) -> Result<Option<PendingSubmission>, BuilderError> {
        self.pipeline.begin(&self.draft)
    }

    /// Second half of a submission. On success the draft is reset and
    /// `Done` is returned; on failure the draft is kept for correction.
    pub fn finish_submit(
        &mut self,
        pending: &PendingSubmission,
        result: Result<serde_json::Value, StoreError>,
    ) -> Result<SubmitOutcome, BuilderError> {
        let outcome = self.pipeline.resolve(pending, result)?;
        if outcome == SubmitOutcome::Done {
            self.clear();
        }
        Ok(outcome)
    }

    /// Submits the draft to `store` and waits for the answer.
    pub async fn submit(&mut self, store: &dyn TriggerStore) -> Result<SubmitOutcome, BuilderError> {
        let Some(pending) = self.begin_submit()? else {
            return Ok(SubmitOutcome::Ignored);
        };
        let result = self.pipeline.send(&pending, store).await;
        self.finish_submit(&pending, result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operator, SourceKind};
    use serde_json::json;

    fn fill_required_text(builder: &mut TriggerBuilder) {
        builder.edit(FieldChange::Phase("READINESS".into()));
        builder.edit(FieldChange::RiverBasin("Doda river at east-west highway".into()));
        builder.edit(FieldChange::Title("Doda danger level".into()));
        builder.edit(FieldChange::Description("Water above danger level".into()));
        builder.edit(FieldChange::RepeatKey("hourly".into()));
        builder.edit(FieldChange::RepeatEvery("2".into()));
    }

    #[test]
    fn test_open_builder_is_empty() {
        let builder = TriggerBuilder::open();
        assert!(builder.draft().is_empty());
        assert!(!builder.is_submittable());
        assert_eq!(builder.state(), &SubmissionState::Idle);
        assert_eq!(
            builder.missing_requirements().last(),
            Some(&DraftField::Source)
        );
    }

    #[test]
    fn test_rejected_edit_reports_false() {
        let mut builder = TriggerBuilder::open();
        assert!(!builder.edit(FieldChange::Value("5".into())));
        assert!(builder.draft().is_empty());
        assert!(builder.edit(FieldChange::Source(Some(SourceKind::WaterLevel))));
        assert!(builder.edit(FieldChange::Value("5".into())));
    }

    #[test]
    fn test_clear_discards_draft() {
        let mut builder = TriggerBuilder::open();
        fill_required_text(&mut builder);
        builder.edit(FieldChange::Source(Some(SourceKind::WaterLevel)));
        builder.clear();
        assert!(builder.draft().is_empty());
        assert!(!builder.visibility().show_sub_measurement_step);
    }

    #[test]
    fn test_finish_submit_resets_draft_on_success_only() {
        let mut builder = TriggerBuilder::open();
        fill_required_text(&mut builder);
        builder.edit(FieldChange::Source(Some(SourceKind::WaterLevel)));
        builder.edit(FieldChange::SubMeasurement("danger_level".into()));
        builder.edit(FieldChange::Operator(Some(Operator::Gte)));
        builder.edit(FieldChange::Value("7.25".into()));
        assert_eq!(builder.preview_expression().as_deref(), Some("danger_level >= 7.25"));

        let pending = builder.begin_submit().unwrap().unwrap();
        let before = builder.draft().clone();
        assert!(
            builder
                .finish_submit(&pending, Err(StoreError::rejected("duplicate title")))
                .is_err()
        );
        assert_eq!(builder.draft(), &before);

        let pending = builder.begin_submit().unwrap().unwrap();
        let outcome = builder.finish_submit(&pending, Ok(json!({"id": 1}))).unwrap();
        assert_eq!(outcome, SubmitOutcome::Done);
        assert!(builder.draft().is_empty());
        assert!(builder.is_finished());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = TriggerBuilder::open();
        let second = TriggerBuilder::open();
        first.edit(FieldChange::Source(Some(SourceKind::Discharge)));
        assert!(first.visibility().show_sub_measurement_step);
        assert!(!second.visibility().show_sub_measurement_step);
    }
}
