use crate::api::ApiError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("could not reach the server: {0}")]
    Network(String),
    #[error("no sentences found")]
    NotFound,
    #[error("translation is empty")]
    Validation,
    #[error("translation check failed: {0}")]
    Service(String),
    #[error("a translation check is already in progress")]
    Busy,
    #[error("sentence {index} is out of range (article has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no article loaded")]
    NoArticle,
    #[error("superseded by a newer load")]
    Superseded,
}

impl SessionError {
    /// Errors the learner can retry from.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Network(_) | SessionError::Service(_))
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => SessionError::Network(msg),
            ApiError::NotFound => SessionError::NotFound,
            ApiError::Service { status, message } => {
                SessionError::Service(format!("{status} {message}"))
            }
            ApiError::Decode(msg) => SessionError::Service(msg),
        }
    }
}
