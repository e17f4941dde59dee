use std::time::Duration;

use crate::api::types::{ArticleWire, CheckRequestBody};
use crate::api::{
    ApiError, Article, ArticleId, ArticleRepository, ArticleSummary, CheckResponse, SentenceId,
    TranslationChecker,
};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// REST client for the practice backend.
pub struct HttpApi {
    base_url: String,
    #[cfg(feature = "network")]
    client: reqwest::blocking::Client,
}

impl HttpApi {
    #[cfg(feature = "network")]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url: normalize_base_url(base_url),
            client,
        })
    }

    #[cfg(not(feature = "network"))]
    pub fn new(base_url: &str, _timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(feature = "network")]
impl HttpApi {
    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().map_err(transport_error)?;
        decode(response)
    }

    fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(transport_error)?;
        decode(response)
    }
}

#[cfg(feature = "network")]
fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

#[cfg(feature = "network")]
fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(ApiError::Service {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.text().map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(not(feature = "network"))]
impl HttpApi {
    fn get_json<T>(&self, _path: &str) -> Result<T, ApiError> {
        Err(ApiError::Network("built without network support".to_string()))
    }

    fn post_json<B, T>(&self, _path: &str, _body: &B) -> Result<T, ApiError> {
        Err(ApiError::Network("built without network support".to_string()))
    }
}

impl ArticleRepository for HttpApi {
    fn list(&self) -> Result<Vec<ArticleSummary>, ApiError> {
        let wires: Vec<ArticleWire> = self.get_json("/api/articles/")?;
        Ok(wires.into_iter().map(ArticleSummary::from).collect())
    }

    fn get(&self, id: ArticleId) -> Result<Article, ApiError> {
        let wire: ArticleWire = self.get_json(&format!("/api/articles/{id}"))?;
        Ok(Article::from(wire))
    }
}

impl TranslationChecker for HttpApi {
    fn check(&self, sentence_id: SentenceId, text: &str) -> Result<CheckResponse, ApiError> {
        let body = CheckRequestBody {
            sentence_id,
            user_translation: text,
        };
        self.post_json("/api/translation/check", &body)
    }
}
