use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::{
    ApiError, Article, ArticleId, ArticleRepository, CheckResponse, Classification, Sentence,
    TranslationChecker,
};
use crate::session::check::{
    CHECK_FAILED_FEEDBACK, CheckOutcome, CheckRequest, CheckState, CheckWorkflow,
    FailedCheckPolicy, Generation,
};
use crate::session::error::SessionError;
use crate::session::history::{HistoryStore, SessionSummary};
use crate::session::layout::LayoutTracker;
use crate::session::scroll::{LayoutEvent, ScrollCoordinator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Studying,
    Completed,
}

/// Message shown under the draft for the current sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Checked {
        classification: Classification,
        message: String,
    },
    Error(String),
}

/// Handle for an article fetch in flight. Only the most recent one is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub article_id: ArticleId,
    generation: u64,
}

pub struct SessionState {
    article: Option<Article>,
    phase: SessionPhase,
    index: usize,
    draft: String,
    feedback: Option<Feedback>,
    last_classification: Option<Classification>,
    history_expanded: bool,
    history: HistoryStore,
    workflow: CheckWorkflow,
    scroll: ScrollCoordinator,
    generation: Generation,
    load_generation: u64,
    loading: Option<LoadTicket>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(
            crate::session::check::DEFAULT_AUTO_ADVANCE,
            FailedCheckPolicy::default(),
        )
    }
}

impl SessionState {
    pub fn new(auto_advance: Duration, failed_check_policy: FailedCheckPolicy) -> Self {
        Self {
            article: None,
            phase: SessionPhase::Empty,
            index: 0,
            draft: String::new(),
            feedback: None,
            last_classification: None,
            history_expanded: false,
            history: HistoryStore::default(),
            workflow: CheckWorkflow::new(auto_advance, failed_check_policy),
            scroll: ScrollCoordinator::default(),
            generation: Generation::default(),
            load_generation: 0,
            loading: None,
        }
    }

    // --- loading ---

    /// Start fetching an article. Any earlier fetch still in flight is
    /// superseded.
    pub fn begin_load(&mut self, article_id: ArticleId) -> LoadTicket {
        self.load_generation += 1;
        let ticket = LoadTicket {
            article_id,
            generation: self.load_generation,
        };
        debug!(%article_id, "article load started");
        self.loading = Some(ticket.clone());
        ticket
    }

    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Article, ApiError>,
    ) -> Result<(), SessionError> {
        if self.loading.as_ref() != Some(ticket) {
            debug!(article_id = %ticket.article_id, "superseded article load dropped");
            return Err(SessionError::Superseded);
        }
        self.loading = None;

        match result {
            Ok(article) if !article.sentences.is_empty() => {
                self.install(article);
                Ok(())
            }
            Ok(_) | Err(ApiError::NotFound) => {
                warn!(article_id = %ticket.article_id, "article has no sentences");
                self.clear_article();
                Err(SessionError::NotFound)
            }
            Err(err) => {
                warn!(article_id = %ticket.article_id, %err, "article load failed");
                Err(err.into())
            }
        }
    }

    /// Fetch and install an article in one step.
    pub fn load_article(
        &mut self,
        repository: &dyn ArticleRepository,
        article_id: ArticleId,
    ) -> Result<(), SessionError> {
        let ticket = self.begin_load(article_id);
        let result = repository.get(article_id);
        self.finish_load(&ticket, result)
    }

    fn install(&mut self, article: Article) {
        info!(
            article_id = %article.id,
            sentences = article.sentences.len(),
            "study session started"
        );
        self.scroll = ScrollCoordinator::new(article.sentences.len());
        self.article = Some(article);
        self.phase = SessionPhase::Studying;
        self.index = 0;
        self.history.clear();
        self.history_expanded = false;
        self.workflow.abandon();
        self.generation = self.generation.next();
        self.clear_sentence_ui();
    }

    fn clear_article(&mut self) {
        self.article = None;
        self.phase = SessionPhase::Empty;
        self.index = 0;
        self.history.clear();
        self.history_expanded = false;
        self.scroll = ScrollCoordinator::default();
        self.workflow.abandon();
        self.generation = self.generation.next();
        self.clear_sentence_ui();
    }

    // --- checking ---

    /// Hand the translation to the check workflow. The returned request must
    /// be sent to the translation service and its answer fed back through
    /// [`SessionState::complete_check`]. Blank text and submissions while a
    /// check is running are rejected without touching the service.
    pub fn submit_translation(&mut self, text: &str) -> Result<CheckRequest, SessionError> {
        if self.phase != SessionPhase::Studying {
            return Err(SessionError::NoArticle);
        }
        if text.trim().is_empty() {
            return Err(SessionError::Validation);
        }
        let sentence_id = self
            .current_sentence()
            .map(|s| s.id)
            .ok_or(SessionError::NoArticle)?;
        self.draft = text.to_string();
        let request = self
            .workflow
            .begin(sentence_id, text, self.generation)
            .ok_or(SessionError::Busy)?;
        self.feedback = None;
        self.last_classification = None;
        Ok(request)
    }

    /// Apply the translation service's answer. Returns the classification when
    /// it applied to the sentence that is still current.
    pub fn complete_check(
        &mut self,
        request: &CheckRequest,
        result: Result<CheckResponse, ApiError>,
        now: Instant,
    ) -> Result<Option<Classification>, SessionError> {
        match self.workflow.complete(request, result, self.generation, now) {
            CheckOutcome::Unexpected => Ok(None),
            CheckOutcome::Resolved {
                sentence_id,
                attempt,
                current,
            } => {
                let classification = attempt.classification;
                let message = attempt.feedback.clone();
                self.history.record_attempt(sentence_id, attempt);
                if !current {
                    return Ok(None);
                }
                self.feedback = Some(Feedback::Checked {
                    classification,
                    message,
                });
                self.last_classification = Some(classification);
                Ok(Some(classification))
            }
            CheckOutcome::Failed {
                sentence_id,
                attempt,
                current,
                error,
            } => {
                if let Some(attempt) = attempt {
                    self.history.record_attempt(sentence_id, attempt);
                }
                if !current {
                    return Ok(None);
                }
                self.feedback = Some(Feedback::Error(CHECK_FAILED_FEEDBACK.to_string()));
                Err(error.into())
            }
        }
    }

    /// Submit and check synchronously against `checker`.
    pub fn check_now(
        &mut self,
        checker: &dyn TranslationChecker,
        text: &str,
        now: Instant,
    ) -> Result<Option<Classification>, SessionError> {
        let request = self.submit_translation(text)?;
        let result = checker.check(request.sentence_id, &request.text);
        self.complete_check(&request, result, now)
    }

    /// Fire the scheduled auto-advance once it is due. Returns whether the
    /// pointer moved (or the session completed).
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.workflow.poll_advance(now, self.generation) {
            self.advance();
            true
        } else {
            false
        }
    }

    // --- navigation ---

    pub fn skip(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Studying {
            return Err(SessionError::NoArticle);
        }
        if self.workflow.is_checking() {
            return Err(SessionError::Busy);
        }
        let sentence_id = self
            .current_sentence()
            .map(|s| s.id)
            .ok_or(SessionError::NoArticle)?;
        self.history.record_skip(sentence_id);
        debug!(%sentence_id, "sentence skipped");
        self.advance();
        Ok(())
    }

    pub fn select_sentence(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.sentence_count();
        if self.article.is_none() {
            return Err(SessionError::NoArticle);
        }
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        self.phase = SessionPhase::Studying;
        self.move_to(index);
        self.history_expanded = false;
        Ok(())
    }

    /// Move to the next sentence, or complete the session after the last one.
    pub fn advance(&mut self) {
        let len = self.sentence_count();
        if len == 0 || self.phase != SessionPhase::Studying {
            return;
        }
        if self.index + 1 >= len {
            info!("study session completed");
            self.phase = SessionPhase::Completed;
            self.generation = self.generation.next();
            self.workflow.reset();
            self.clear_sentence_ui();
        } else {
            self.move_to(self.index + 1);
        }
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.generation = self.generation.next();
        self.workflow.reset();
        self.clear_sentence_ui();
        self.scroll.scroll_to_if_needed(index);
    }

    fn clear_sentence_ui(&mut self) {
        self.draft.clear();
        self.feedback = None;
        self.last_classification = None;
    }

    // --- layout ---

    pub fn apply_layout(&mut self, event: LayoutEvent) -> Option<u32> {
        self.scroll.apply(event)
    }

    /// Move the reference list by `delta` rows, as the learner scrolling it.
    pub fn scroll_by(&mut self, delta: i32) {
        let mut target = self.scroll.scroll_offset().saturating_add_signed(delta);
        let tracker = self.scroll.tracker();
        if let Some(content) = tracker.content_height() {
            target = target.min(content.saturating_sub(tracker.viewport_height()));
        }
        self.scroll.apply(LayoutEvent::Scrolled { offset: target });
    }

    // --- read access ---

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn sentences(&self) -> &[Sentence] {
        self.article
            .as_ref()
            .map(|a| a.sentences.as_slice())
            .unwrap_or(&[])
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences().len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_sentence(&self) -> Option<&Sentence> {
        self.sentences().get(self.index)
    }

    /// 1-based position and total, for the progress bar.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.sentence_count();
        if total == 0 {
            return (0, 0);
        }
        let done = match self.phase {
            SessionPhase::Completed => total,
            _ => self.index + 1,
        };
        (done, total)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft.clear();
        self.draft.push_str(text);
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn last_classification(&self) -> Option<Classification> {
        self.last_classification
    }

    pub fn is_checking(&self) -> bool {
        self.workflow.is_checking()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn check_state(&self) -> &CheckState {
        self.workflow.state()
    }

    /// The draft is frozen while a check runs and while a correct answer
    /// waits for its auto-advance.
    pub fn input_locked(&self) -> bool {
        !self.workflow.accepts_submission()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_expanded(&self) -> bool {
        self.history_expanded
    }

    pub fn toggle_history(&mut self) {
        self.history_expanded = !self.history_expanded;
    }

    pub fn layout(&self) -> &LayoutTracker {
        self.scroll.tracker()
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll.scroll_offset()
    }

    pub fn summary(&self) -> SessionSummary {
        self.history.summary(self.sentences())
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SentenceId;
    use crate::session::history::SentenceStatus;

    fn article(texts: &[&str]) -> Article {
        Article {
            id: ArticleId(1),
            title: "Daily".to_string(),
            sentences: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Sentence {
                    id: SentenceId(100 + i as u64),
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    fn studying(texts: &[&str]) -> SessionState {
        let mut session = SessionState::default();
        let ticket = session.begin_load(ArticleId(1));
        session.finish_load(&ticket, Ok(article(texts))).unwrap();
        session
    }

    fn response(classification: Classification) -> Result<CheckResponse, ApiError> {
        Ok(CheckResponse {
            is_correct: classification.advances(),
            feedback: Some("ok".to_string()),
            result: Some(classification),
        })
    }

    #[test]
    fn test_load_initializes_pointer() {
        let session = studying(&["I eat.", "You run."]);
        assert_eq!(session.phase(), SessionPhase::Studying);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.progress(), (1, 2));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_empty_article_is_not_found() {
        let mut session = SessionState::default();
        let ticket = session.begin_load(ArticleId(9));
        assert_eq!(
            session.finish_load(&ticket, Ok(article(&[]))),
            Err(SessionError::NotFound)
        );
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.article().is_none());
    }

    #[test]
    fn test_network_failure_keeps_session() {
        let mut session = studying(&["I eat.", "You run."]);
        session.select_sentence(1).unwrap();
        let ticket = session.begin_load(ArticleId(2));
        let err = session
            .finish_load(&ticket, Err(ApiError::Network("refused".into())))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.phase(), SessionPhase::Studying);
    }

    #[test]
    fn test_superseded_load_dropped() {
        let mut session = SessionState::default();
        let first = session.begin_load(ArticleId(1));
        let second = session.begin_load(ArticleId(2));
        assert_eq!(
            session.finish_load(&first, Ok(article(&["old"]))),
            Err(SessionError::Superseded)
        );
        assert!(session.article().is_none());
        let mut newer = article(&["new"]);
        newer.id = ArticleId(2);
        session.finish_load(&second, Ok(newer)).unwrap();
        assert_eq!(session.article().map(|a| a.id), Some(ArticleId(2)));
    }

    #[test]
    fn test_blank_submission_is_validation_error() {
        let mut session = studying(&["I eat."]);
        assert_eq!(session.submit_translation(""), Err(SessionError::Validation));
        assert_eq!(session.submit_translation("   "), Err(SessionError::Validation));
        assert!(!session.is_checking());
    }

    #[test]
    fn test_select_clears_sentence_state() {
        let mut session = studying(&["I eat.", "You run.", "She sings."]);
        let request = session.submit_translation("틀린 번역").unwrap();
        session
            .complete_check(&request, response(Classification::Incorrect), Instant::now())
            .unwrap();
        session.toggle_history();
        assert!(session.feedback().is_some());

        session.select_sentence(2).unwrap();
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.draft(), "");
        assert!(session.feedback().is_none());
        assert!(session.last_classification().is_none());
        assert!(!session.history_expanded());
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = studying(&["I eat."]);
        assert_eq!(
            session.select_sentence(3),
            Err(SessionError::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_skip_records_and_advances() {
        let mut session = studying(&["I eat.", "You run."]);
        session.skip().unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(
            session.history().status_of(SentenceId(100)),
            SentenceStatus::Skipped
        );
    }

    #[test]
    fn test_skip_last_completes() {
        let mut session = studying(&["I eat."]);
        session.skip().unwrap();
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(session.progress(), (1, 1));
    }

    #[test]
    fn test_skip_rejected_while_checking() {
        let mut session = studying(&["I eat.", "You run."]);
        session.submit_translation("나는 먹는다").unwrap();
        assert_eq!(session.skip(), Err(SessionError::Busy));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_failed_check_shows_error_feedback() {
        let mut session = studying(&["I eat."]);
        let request = session.submit_translation("나는 먹는다").unwrap();
        let err = session
            .complete_check(
                &request,
                Err(ApiError::Service {
                    status: 500,
                    message: "down".into(),
                }),
                Instant::now(),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Service(_)));
        assert_eq!(
            session.feedback(),
            Some(&Feedback::Error(CHECK_FAILED_FEEDBACK.to_string()))
        );
        assert!(session.history().attempts(SentenceId(100)).is_empty());
        assert!(!session.input_locked());
    }

    #[test]
    fn test_input_locked_until_advance() {
        let mut session = studying(&["I eat.", "You run."]);
        let request = session.submit_translation("나는 먹는다").unwrap();
        assert!(session.input_locked());
        let t0 = Instant::now();
        session
            .complete_check(&request, response(Classification::Good), t0)
            .unwrap();
        assert!(session.input_locked());
        assert!(session.tick(t0 + Duration::from_secs(2)));
        assert!(!session.input_locked());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_scroll_by_clamps_to_content() {
        let mut session = studying(&["a", "b", "c"]);
        for position in 0..3 {
            session.apply_layout(LayoutEvent::ItemMeasured {
                position,
                height: 2,
            });
        }
        session.apply_layout(LayoutEvent::ViewportResized { height: 4 });
        session.scroll_by(10);
        assert_eq!(session.scroll_offset(), 2);
        session.scroll_by(-5);
        assert_eq!(session.scroll_offset(), 0);
    }

    #[test]
    fn test_advance_scrolls_new_sentence_into_view() {
        let mut session = studying(&["a", "b", "c"]);
        for position in 0..3 {
            session.apply_layout(LayoutEvent::ItemMeasured {
                position,
                height: 3,
            });
        }
        session.apply_layout(LayoutEvent::ViewportResized { height: 4 });
        session.advance();
        // item 1 spans [3, 6]
        assert_eq!(session.scroll_offset(), 2);
    }

    #[test]
    fn test_scroll_by_saturates_before_rows_are_measured() {
        let mut session = studying(&["a", "b"]);
        for _ in 0..3 {
            session.scroll_by(i32::MAX);
        }
        assert_eq!(session.scroll_offset(), u32::MAX);
        session.scroll_by(i32::MIN);
        session.scroll_by(i32::MIN);
        session.scroll_by(i32::MIN);
        assert_eq!(session.scroll_offset(), 0);
    }
}
