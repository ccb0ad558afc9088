//! Access to the upstream stock endpoint.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::UpstreamConfig;

const USER_AGENT: &str = "Python Requests Client/1.0 (GAG Backend Integration)";

/// Upstream only answers requests that look like they came from its own frontend.
const HEADERS: [(&str, &str); 6] = [
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("priority", "u=1, i"),
    ("referer", "https://growagarden.gg/stocks"),
    ("trpc-accept", "application/json"),
    ("x-trpc-source", "gag"),
];

const MAX_MESSAGE_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Upstream responded with {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Decoding upstream response: {0}")]
    Decode(String),
    #[error("Upstream request timed out")]
    Timeout,
    #[error("Sending upstream request: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn code(&self) -> u16 {
        match self {
            Self::Status { code, .. } => *code,
            Self::Decode(_) => 500,
            Self::Timeout => 504,
            Self::Transport(_) => 502,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Something that can produce the raw upstream payload.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<serde_json::Value, FetchError>> + Send;
}

pub struct Client {
    req_client: reqwest::Client,
    url: String,
}

impl Client {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        for (name, value) in HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let req_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            req_client,
            url: config.url.clone(),
        })
    }
}

impl Fetch for Client {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self) -> Result<serde_json::Value, FetchError> {
        tracing::debug!(url = %self.url, "Fetching stocks");

        let resp = self
            .req_client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("Non Success Response: {:?}", status);

            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("Upstream error").to_string()
            } else {
                truncate(&body, MAX_MESSAGE_LEN)
            };

            return Err(FetchError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let raw_content = resp.bytes().await.map_err(FetchError::from_reqwest)?;

        serde_json::from_slice(&raw_content).map_err(|e| {
            tracing::error!("Deserializing Response {:?}", e);
            FetchError::Decode(e.to_string())
        })
    }
}

fn truncate(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}
