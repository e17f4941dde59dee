use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiError, CheckResponse, Classification, SentenceId};
use crate::session::history::Attempt;

pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(2000);
pub const CHECK_FAILED_FEEDBACK: &str = "Error checking translation. Please try again.";

/// Counter bumped every time the current sentence changes. Work started under
/// one generation is stale under any other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// What to do with a submission whose check call failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailedCheckPolicy {
    /// Show the error and forget the submission.
    #[default]
    Discard,
    /// Keep the submission in the history as an incorrect attempt.
    RecordIncorrect,
}

/// A check that has been handed to the translation service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckRequest {
    pub sentence_id: SentenceId,
    pub text: String,
    pub generation: Generation,
    ticket: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub due_at: Instant,
    pub generation: Generation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckState {
    Idle,
    Checking(CheckRequest),
    Resolved {
        classification: Classification,
        advance: Option<ScheduledAdvance>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The completion does not belong to the request in flight.
    Unexpected,
    Resolved {
        sentence_id: SentenceId,
        attempt: Attempt,
        current: bool,
    },
    Failed {
        sentence_id: SentenceId,
        attempt: Option<Attempt>,
        current: bool,
        error: ApiError,
    },
}

#[derive(Clone, Debug)]
pub struct CheckWorkflow {
    state: CheckState,
    next_ticket: u64,
    delay: Duration,
    policy: FailedCheckPolicy,
}

impl Default for CheckWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_ADVANCE, FailedCheckPolicy::default())
    }
}

impl CheckWorkflow {
    pub fn new(delay: Duration, policy: FailedCheckPolicy) -> Self {
        Self {
            state: CheckState::Idle,
            next_ticket: 0,
            delay,
            policy,
        }
    }

    pub fn state(&self) -> &CheckState {
        &self.state
    }

    pub fn is_checking(&self) -> bool {
        matches!(self.state, CheckState::Checking(_))
    }

    pub fn scheduled_advance(&self) -> Option<ScheduledAdvance> {
        match self.state {
            CheckState::Resolved { advance, .. } => advance,
            _ => None,
        }
    }

    /// Idle, or resolved without a pending advance (an incorrect answer can be
    /// resubmitted).
    pub fn accepts_submission(&self) -> bool {
        match self.state {
            CheckState::Idle => true,
            CheckState::Resolved { advance, .. } => advance.is_none(),
            CheckState::Checking(_) => false,
        }
    }

    /// Start a check. Callers must reject blank text before getting here.
    pub fn begin(
        &mut self,
        sentence_id: SentenceId,
        text: &str,
        generation: Generation,
    ) -> Option<CheckRequest> {
        if text.trim().is_empty() || !self.accepts_submission() {
            return None;
        }
        self.next_ticket += 1;
        let request = CheckRequest {
            sentence_id,
            text: text.to_string(),
            generation,
            ticket: self.next_ticket,
        };
        debug!(%sentence_id, ticket = request.ticket, "check started");
        self.state = CheckState::Checking(request.clone());
        Some(request)
    }

    /// Apply the service's answer for `request`. `current` is the session's
    /// generation at the time the answer arrives.
    pub fn complete(
        &mut self,
        request: &CheckRequest,
        result: Result<CheckResponse, ApiError>,
        current: Generation,
        now: Instant,
    ) -> CheckOutcome {
        match &self.state {
            CheckState::Checking(in_flight) if in_flight.ticket == request.ticket => {}
            _ => {
                warn!(ticket = request.ticket, "completion for unknown check dropped");
                return CheckOutcome::Unexpected;
            }
        }
        let is_current = request.generation == current;

        match result {
            Ok(response) => {
                let classification = response.classification();
                let attempt = Attempt::new(
                    &request.text,
                    response.feedback_text(),
                    response.is_correct,
                    classification,
                );
                self.state = if is_current {
                    let advance = classification.advances().then(|| ScheduledAdvance {
                        due_at: now + self.delay,
                        generation: current,
                    });
                    info!(?classification, scheduled = advance.is_some(), "check resolved");
                    CheckState::Resolved {
                        classification,
                        advance,
                    }
                } else {
                    debug!(?classification, "check resolved for a sentence no longer current");
                    CheckState::Idle
                };
                CheckOutcome::Resolved {
                    sentence_id: request.sentence_id,
                    attempt,
                    current: is_current,
                }
            }
            Err(error) => {
                warn!(%error, "translation check failed");
                self.state = CheckState::Idle;
                let attempt = match self.policy {
                    FailedCheckPolicy::Discard => None,
                    FailedCheckPolicy::RecordIncorrect => Some(Attempt::new(
                        &request.text,
                        CHECK_FAILED_FEEDBACK,
                        false,
                        Classification::Incorrect,
                    )),
                };
                CheckOutcome::Failed {
                    sentence_id: request.sentence_id,
                    attempt,
                    current: is_current,
                    error,
                }
            }
        }
    }

    /// Fire a due auto-advance. Returns true only when the advance belongs to
    /// the `current` generation; a stale one is dropped.
    pub fn poll_advance(&mut self, now: Instant, current: Generation) -> bool {
        let Some(advance) = self.scheduled_advance() else {
            return false;
        };
        if now < advance.due_at {
            return false;
        }
        self.state = CheckState::Idle;
        if advance.generation != current {
            debug!("stale auto-advance dropped");
            return false;
        }
        true
    }

    /// Forget the resolved result and any scheduled advance after the pointer
    /// moved. A check in flight stays in flight so a second one cannot start.
    pub fn reset(&mut self) {
        if !self.is_checking() {
            self.state = CheckState::Idle;
        }
    }

    /// Drop everything, including a check in flight, when the article
    /// changes. Ticket numbering continues so an answer to the abandoned
    /// check can never be mistaken for a later one.
    pub fn abandon(&mut self) {
        if self.is_checking() {
            debug!("in-flight check abandoned");
        }
        self.state = CheckState::Idle;
    }
}
