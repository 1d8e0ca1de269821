//! Submission pipeline.
//!
//! Owns the single create request a builder may have in flight:
//!
//!   Idle ──begin──▶ Submitting ──resolve──▶ Succeeded
//!                        │
//!                        └──────resolve──▶ Failed ──begin──▶ Submitting
//!
//! `begin` refuses drafts that are not submittable and is a no-op while a
//! request is in flight or after success. Each `begin` is answered by exactly
//! one `resolve`; answers for any other attempt are ignored. The trigger
//! store itself is an external collaborator behind [`TriggerStore`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::canonical::{self, CanonicalTrigger, TriggerPayload};
use crate::disclosure;
use crate::logging::{self, Component};
use crate::model::{BuilderError, TriggerDraft};

// ---------------------------------------------------------------------------
// Trigger store collaborator
// ---------------------------------------------------------------------------

/// Failure reported by the trigger store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the payload (validation, duplicates, ...).
    #[error("rejected by trigger store: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { detail: Option<String> },
    /// The request never got a structured answer.
    #[error("transport failure: {}", .detail.as_deref().unwrap_or("no detail"))]
    Transport { detail: Option<String> },
}

impl StoreError {
    pub fn rejected(detail: impl Into<String>) -> Self {
        StoreError::Rejected {
            detail: Some(detail.into()),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        StoreError::Transport {
            detail: Some(detail.into()),
        }
    }

    /// Human-readable detail supplied by the collaborator, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            StoreError::Rejected { detail } | StoreError::Transport { detail } => {
                detail.as_deref()
            }
        }
    }
}

/// Accepts create requests for trigger statements.
///
/// The returned resource is not interpreted; its presence means success.
#[async_trait]
pub trait TriggerStore: Send + Sync {
    async fn create(&self, payload: &TriggerPayload) -> Result<serde_json::Value, StoreError>;
}

// ---------------------------------------------------------------------------
// Pipeline state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed { detail: Option<String> },
}

/// Result of a submit action that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store accepted the trigger; the caller can move on to its listing.
    Done,
    /// Nothing was sent or recorded: a request is already in flight, the
    /// builder has already succeeded, or the answer was for a stale attempt.
    Ignored,
}

/// A create request that has been started but not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub canonical: CanonicalTrigger,
    pub started_at: DateTime<Utc>,
    attempt: u64,
}

impl PendingSubmission {
    pub fn payload(&self) -> &TriggerPayload {
        &self.canonical.payload
    }

    /// Sequence number of the `begin` call that created this submission.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }
}

#[derive(Debug, Default)]
pub struct SubmissionPipeline {
    state: SubmissionState,
    timeout: Option<Duration>,
    attempts: u64,
    last_started_at: Option<DateTime<Utc>>,
    last_resolved_at: Option<DateTime<Utc>>,
}

impl SubmissionPipeline {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn is_finished(&self) -> bool {
        self.state == SubmissionState::Succeeded
    }

    /// Failure detail from the last rejected attempt.
    pub fn failure_detail(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed { detail } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn last_started_at(&self) -> Option<DateTime<Utc>> {
        self.last_started_at
    }

    pub fn last_resolved_at(&self) -> Option<DateTime<Utc>> {
        self.last_resolved_at
    }

    /// Starts a submission for `draft`.
    ///
    /// Returns `Ok(None)` without side effects while a request is in flight
    /// or after success, and `NotSubmittable` (state unchanged) when the
    /// draft is incomplete.
    pub fn begin(&mut self, draft: &TriggerDraft) -> Result<Option<PendingSubmission>, BuilderError> {
        match self.state {
            SubmissionState::Submitting => {
                logging::debug(Component::Submission, None, "submit ignored: request in flight");
                return Ok(None);
            }
            SubmissionState::Succeeded => {
                logging::debug(Component::Submission, None, "submit ignored: already succeeded");
                return Ok(None);
            }
            SubmissionState::Idle | SubmissionState::Failed { .. } => {}
        }

        if !disclosure::is_submittable(draft) {
            let missing = disclosure::missing_requirements(draft);
            logging::debug(
                Component::Submission,
                missing.first().copied(),
                "submit refused: draft incomplete",
            );
            return Err(BuilderError::NotSubmittable { missing });
        }

        let canonical = canonical::canonicalize(draft).inspect_err(|err| {
            // Disclosure already accepted this draft, so this is a defect.
            logging::error(Component::Canonicalizer, None, &err.to_string());
        })?;

        let started_at = Utc::now();
        self.attempts += 1;
        self.state = SubmissionState::Submitting;
        self.last_started_at = Some(started_at);
        self.last_resolved_at = None;
        logging::info(
            Component::Submission,
            None,
            &format!("creating trigger '{}': {}", draft.title, canonical.expression),
        );

        Ok(Some(PendingSubmission {
            canonical,
            started_at,
            attempt: self.attempts,
        }))
    }

    /// Sends a pending payload to the store, bounded by the configured
    /// timeout. Does not change pipeline state.
    pub async fn send(
        &self,
        pending: &PendingSubmission,
        store: &dyn TriggerStore,
    ) -> Result<serde_json::Value, StoreError> {
        let request = store.create(pending.payload());
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                StoreError::transport(format!("request timed out after {}s", limit.as_secs()))
            })?,
            None => request.await,
        }
    }

    /// Records the store's answer for `pending`.
    ///
    /// Only the attempt currently in flight can be resolved, and only once.
    /// Repeated or stale answers return `Ignored` and leave the state alone.
    pub fn resolve(
        &mut self,
        pending: &PendingSubmission,
        result: Result<serde_json::Value, StoreError>,
    ) -> Result<SubmitOutcome, BuilderError> {
        if self.state != SubmissionState::Submitting || pending.attempt != self.attempts {
            logging::debug(
                Component::Submission,
                None,
                &format!("answer for attempt {} ignored: not in flight", pending.attempt),
            );
            return Ok(SubmitOutcome::Ignored);
        }

        let resolved_at = Utc::now();
        self.last_resolved_at = Some(resolved_at);
        let elapsed_ms = (resolved_at - pending.started_at).num_milliseconds();
        let title = &pending.payload().title;

        match result {
            Ok(_) => {
                self.state = SubmissionState::Succeeded;
                logging::info(
                    Component::Submission,
                    None,
                    &format!("trigger '{}' created in {} ms", title, elapsed_ms),
                );
                Ok(SubmitOutcome::Done)
            }
            Err(err) => {
                logging::log_submission_failure(title, &err);
                let detail = err.detail().map(str::to_string);
                self.state = SubmissionState::Failed {
                    detail: detail.clone(),
                };
                Err(BuilderError::SubmissionFailed { detail })
            }
        }
    }

    /// Runs `begin`, `send` and `resolve` in sequence.
    pub async fn submit(
        &mut self,
        draft: &TriggerDraft,
        store: &dyn TriggerStore,
    ) -> Result<SubmitOutcome, BuilderError> {
        let Some(pending) = self.begin(draft)? else {
            return Ok(SubmitOutcome::Ignored);
        };
        let result = self.send(&pending, store).await;
        self.resolve(&pending, result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
