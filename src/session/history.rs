use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Classification, Sentence, SentenceId};

/// Display state of a sentence in the reference list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentenceStatus {
    Perfect,
    Good,
    Incorrect,
    Skipped,
    NotAttempted,
}

impl From<Classification> for SentenceStatus {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Perfect => SentenceStatus::Perfect,
            Classification::Good => SentenceStatus::Good,
            Classification::Incorrect => SentenceStatus::Incorrect,
        }
    }
}

/// One checked translation. Never modified after it is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub input: String,
    pub feedback: String,
    pub is_correct: bool,
    pub classification: Classification,
    pub recorded_at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(
        input: &str,
        feedback: &str,
        is_correct: bool,
        classification: Classification,
    ) -> Self {
        Self {
            input: input.to_string(),
            feedback: feedback.to_string(),
            is_correct,
            classification,
            recorded_at: Utc::now(),
        }
    }
}

/// Status derived from an attempt log. The latest attempt always wins; the skip
/// marker only shows through while the log is empty.
pub fn status(attempts: &[Attempt], was_skipped: bool) -> SentenceStatus {
    match attempts.last() {
        Some(attempt) => attempt.classification.into(),
        None if was_skipped => SentenceStatus::Skipped,
        None => SentenceStatus::NotAttempted,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SentenceRecord {
    attempts: Vec<Attempt>,
    skipped: bool,
}

impl SentenceRecord {
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn status(&self) -> SentenceStatus {
        status(&self.attempts, self.skipped)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub perfect: usize,
    pub good: usize,
    pub incorrect: usize,
    pub skipped: usize,
    pub not_attempted: usize,
    pub attempts: usize,
}

impl SessionSummary {
    pub fn total(&self) -> usize {
        self.perfect + self.good + self.incorrect + self.skipped + self.not_attempted
    }
}

/// Per-sentence attempt logs for the current session.
#[derive(Clone, Debug, Default)]
pub struct HistoryStore {
    records: HashMap<SentenceId, SentenceRecord>,
}

impl HistoryStore {
    pub fn record_attempt(&mut self, sentence_id: SentenceId, attempt: Attempt) -> SentenceStatus {
        let record = self.records.entry(sentence_id).or_default();
        record.attempts.push(attempt);
        record.status()
    }

    /// Mark a sentence skipped. A sentence that already has attempts keeps its
    /// status.
    pub fn record_skip(&mut self, sentence_id: SentenceId) -> SentenceStatus {
        let record = self.records.entry(sentence_id).or_default();
        if record.attempts.is_empty() {
            record.skipped = true;
        }
        record.status()
    }

    pub fn status_of(&self, sentence_id: SentenceId) -> SentenceStatus {
        self.records
            .get(&sentence_id)
            .map(SentenceRecord::status)
            .unwrap_or(SentenceStatus::NotAttempted)
    }

    pub fn attempts(&self, sentence_id: SentenceId) -> &[Attempt] {
        self.records
            .get(&sentence_id)
            .map(SentenceRecord::attempts)
            .unwrap_or(&[])
    }

    pub fn record(&self, sentence_id: SentenceId) -> Option<&SentenceRecord> {
        self.records.get(&sentence_id)
    }

    pub fn summary<'a>(&self, sentences: impl IntoIterator<Item = &'a Sentence>) -> SessionSummary {
        let mut summary = SessionSummary::default();
        for sentence in sentences {
            summary.attempts += self.attempts(sentence.id).len();
            match self.status_of(sentence.id) {
                SentenceStatus::Perfect => summary.perfect += 1,
                SentenceStatus::Good => summary.good += 1,
                SentenceStatus::Incorrect => summary.incorrect += 1,
                SentenceStatus::Skipped => summary.skipped += 1,
                SentenceStatus::NotAttempted => summary.not_attempted += 1,
            }
        }
        summary
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S0: SentenceId = SentenceId(10);
    const S1: SentenceId = SentenceId(11);

    fn attempt(classification: Classification) -> Attempt {
        Attempt::new(
            "나는 먹는다.",
            "feedback",
            classification.advances(),
            classification,
        )
    }

    #[test]
    fn test_unknown_sentence_is_not_attempted() {
        let store = HistoryStore::default();
        assert_eq!(store.status_of(S0), SentenceStatus::NotAttempted);
        assert!(store.attempts(S0).is_empty());
    }

    #[test]
    fn test_latest_attempt_sets_status() {
        let mut store = HistoryStore::default();
        assert_eq!(
            store.record_attempt(S0, attempt(Classification::Incorrect)),
            SentenceStatus::Incorrect
        );
        assert_eq!(
            store.record_attempt(S0, attempt(Classification::Perfect)),
            SentenceStatus::Perfect
        );
        // a worse later attempt still overrides
        store.record_attempt(S0, attempt(Classification::Good));
        assert_eq!(store.status_of(S0), SentenceStatus::Good);
        assert_eq!(store.attempts(S0).len(), 3);
    }

    #[test]
    fn test_skip_on_empty_log() {
        let mut store = HistoryStore::default();
        assert_eq!(store.record_skip(S0), SentenceStatus::Skipped);
        assert!(store.attempts(S0).is_empty());
    }

    #[test]
    fn test_skip_never_downgrades() {
        for classification in [
            Classification::Perfect,
            Classification::Good,
            Classification::Incorrect,
        ] {
            let mut store = HistoryStore::default();
            store.record_attempt(S0, attempt(classification));
            store.record_skip(S0);
            assert_eq!(store.status_of(S0), classification.into());
        }
    }

    #[test]
    fn test_attempt_after_skip_replaces_skipped() {
        let mut store = HistoryStore::default();
        store.record_skip(S0);
        store.record_attempt(S0, attempt(Classification::Incorrect));
        assert_eq!(store.status_of(S0), SentenceStatus::Incorrect);
    }

    #[test]
    fn test_status_pure_function() {
        assert_eq!(status(&[], false), SentenceStatus::NotAttempted);
        assert_eq!(status(&[], true), SentenceStatus::Skipped);
        let log = vec![attempt(Classification::Good)];
        assert_eq!(status(&log, true), SentenceStatus::Good);
    }

    #[test]
    fn test_records_are_per_sentence() {
        let mut store = HistoryStore::default();
        store.record_attempt(S0, attempt(Classification::Perfect));
        store.record_skip(S1);
        assert_eq!(store.status_of(S0), SentenceStatus::Perfect);
        assert_eq!(store.status_of(S1), SentenceStatus::Skipped);
    }

    #[test]
    fn test_summary_counts_statuses() {
        let sentences = vec![
            Sentence { id: S0, text: "I eat.".into() },
            Sentence { id: S1, text: "You run.".into() },
            Sentence { id: SentenceId(12), text: "She sings.".into() },
        ];
        let mut store = HistoryStore::default();
        store.record_attempt(S0, attempt(Classification::Incorrect));
        store.record_attempt(S0, attempt(Classification::Perfect));
        store.record_skip(S1);

        let summary = store.summary(&sentences);
        assert_eq!(summary.perfect, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.not_attempted, 1);
        assert_eq!(summary.attempts, 2);
        assert_eq!(summary.total(), 3);
    }
}
