pub mod http;
pub mod types;

pub use http::HttpApi;
pub use types::{
    Article, ArticleId, ArticleSummary, CheckResponse, Classification, Sentence, SentenceId,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("server returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

pub trait ArticleRepository {
    fn list(&self) -> Result<Vec<ArticleSummary>, ApiError>;
    fn get(&self, id: ArticleId) -> Result<Article, ApiError>;
}

pub trait TranslationChecker {
    fn check(&self, sentence_id: SentenceId, text: &str) -> Result<CheckResponse, ApiError>;
}

/// Both collaborators behind one handle that worker threads can share.
pub trait Backend: ArticleRepository + TranslationChecker + Send + Sync {}

impl<T> Backend for T where T: ArticleRepository + TranslationChecker + Send + Sync {}
