//! Trigger definition builder for flood early-warning.
//!
//! An operator authors a trigger statement: a condition over a hydrological
//! or meteorological source compared against a threshold, tagged with a
//! phase, river basin and repeat schedule. This crate holds the rules for
//! that authoring step:
//!
//! - `sources`: the static taxonomy of sources and their sub-measurements.
//! - `draft`: edits to the draft, with cascading resets on source change.
//! - `disclosure`: which dependent steps are shown and when a draft is
//!   submittable.
//! - `canonical`: the expression string and the payload sent to storage.
//! - `submission`: the single in-flight create request and its outcome.
//! - `builder`: one authoring session tying the above together.
//!
//! Storage, transport and presentation are external collaborators.

pub mod builder;
pub mod canonical;
pub mod config;
pub mod disclosure;
pub mod draft;
pub mod logging;
pub mod model;
pub mod sources;
pub mod submission;

pub use builder::TriggerBuilder;
pub use canonical::{CanonicalTrigger, TriggerPayload, TriggerStatement, canonicalize};
pub use config::BuilderConfig;
pub use disclosure::{Visibility, is_submittable, visibility};
pub use model::{
    BuilderError, DraftField, FieldChange, Operator, SourceKind, TriggerDraft, TriggerType,
};
pub use submission::{StoreError, SubmissionState, SubmitOutcome, TriggerStore};
