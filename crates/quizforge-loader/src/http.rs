//! Question banks served over HTTP.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use quizforge_core::{BankSource, LoadError};

use crate::BANK_FILE_NAME;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches the bank document with a single GET.
pub struct HttpBankSource {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpBankSource {
    /// `base_url` is either the document URL itself (ending in `.json`) or
    /// a directory URL that `exam.json` is resolved against.
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LoadError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: bank_url(base_url),
            timeout_secs,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn bank_url(base_url: &str) -> String {
    if base_url.ends_with(".json") {
        base_url.to_string()
    } else {
        format!("{}/{BANK_FILE_NAME}", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BankSource for HttpBankSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Value, LoadError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                LoadError::Transport(format!("{} is not reachable", self.url))
            } else {
                LoadError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(LoadError::Http {
                url: self.url.clone(),
                status,
            });
        }

        let document: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout(self.timeout_secs)
            } else {
                LoadError::Parse(e.to_string())
            }
        })?;
        tracing::debug!(status, "question bank fetched");
        Ok(document)
    }
}
