use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub u64);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentenceId(pub u64);

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sentence {
    pub id: SentenceId,
    pub text: String,
}

/// A loaded article. Sentence order is the study order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub sentences: Vec<Sentence>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    pub sentence_count: usize,
}

/// Tiered outcome of a checked translation: perfect > good > incorrect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Perfect,
    Good,
    Incorrect,
}

impl Classification {
    /// Perfect and good results move the learner on to the next sentence.
    pub fn advances(self) -> bool {
        matches!(self, Classification::Perfect | Classification::Good)
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Perfect => "Perfect",
            Classification::Good => "Good",
            Classification::Incorrect => "Incorrect",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub result: Option<Classification>,
}

impl CheckResponse {
    /// Older servers only send `is_correct`; map that onto the tiers.
    pub fn classification(&self) -> Classification {
        match self.result {
            Some(c) => c,
            None if self.is_correct => Classification::Good,
            None => Classification::Incorrect,
        }
    }

    pub fn feedback_text(&self) -> &str {
        self.feedback.as_deref().unwrap_or("")
    }
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct CheckRequestBody<'a> {
    pub sentence_id: SentenceId,
    pub user_translation: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SentenceWire {
    pub id: SentenceId,
    pub text: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ArticleWire {
    pub id: ArticleId,
    pub title: String,
    #[serde(default)]
    pub sentences: Vec<SentenceWire>,
}

impl From<ArticleWire> for Article {
    fn from(wire: ArticleWire) -> Self {
        let mut sentences = wire.sentences;
        sentences.sort_by_key(|s| s.order);
        Self {
            id: wire.id,
            title: wire.title,
            sentences: sentences
                .into_iter()
                .map(|s| Sentence {
                    id: s.id,
                    text: s.text,
                })
                .collect(),
        }
    }
}

impl From<ArticleWire> for ArticleSummary {
    fn from(wire: ArticleWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            sentence_count: wire.sentences.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_response_with_result_tier() {
        let json = r#"{"is_correct": true, "feedback": "완벽", "result": "perfect"}"#;
        let resp: CheckResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.classification(), Classification::Perfect);
        assert_eq!(resp.feedback_text(), "완벽");
    }

    #[test]
    fn test_check_response_without_result_falls_back_to_flag() {
        let correct: CheckResponse =
            serde_json::from_str(r#"{"is_correct": true, "feedback": null}"#).unwrap();
        assert_eq!(correct.classification(), Classification::Good);
        assert_eq!(correct.feedback_text(), "");

        let wrong: CheckResponse = serde_json::from_str(r#"{"is_correct": false}"#).unwrap();
        assert_eq!(wrong.classification(), Classification::Incorrect);
    }

    #[test]
    fn test_article_sentences_sorted_by_order() {
        let json = r#"{
            "id": 7,
            "title": "Daily",
            "content": "ignored",
            "sentences": [
                {"id": 3, "text": "She sings.", "order": 2},
                {"id": 1, "text": "I eat.", "order": 0},
                {"id": 2, "text": "You run.", "order": 1}
            ]
        }"#;
        let wire: ArticleWire = serde_json::from_str(json).unwrap();
        let article = Article::from(wire);
        let texts: Vec<&str> = article.sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["I eat.", "You run.", "She sings."]);
        assert_eq!(article.id, ArticleId(7));
    }

    #[test]
    fn test_summary_counts_embedded_sentences() {
        let json = r#"[{"id": 1, "title": "A", "sentences": [{"id": 1, "text": "x"}]},
                       {"id": 2, "title": "B"}]"#;
        let wires: Vec<ArticleWire> = serde_json::from_str(json).unwrap();
        let summaries: Vec<ArticleSummary> = wires.into_iter().map(Into::into).collect();
        assert_eq!(summaries[0].sentence_count, 1);
        assert_eq!(summaries[1].sentence_count, 0);
    }

    #[test]
    fn test_only_perfect_and_good_advance() {
        assert!(Classification::Perfect.advances());
        assert!(Classification::Good.advances());
        assert!(!Classification::Incorrect.advances());
    }
}
