//! Environment Canada datamart client.
//!
//! Fetches raw citypage XML bulletins from the public datamart. One bulletin
//! exists per (site code, language); the client returns the body as-is and
//! leaves parsing to `services::bulletin`.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;

use crate::db::models::{Language, Province};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("datamart returned HTTP {status}")]
    Upstream { status: u16 },

    #[error("datamart request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the citypage bulletin datamart.
#[derive(Debug, Clone)]
pub struct EcClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl EcClient {
    /// `base_url` without a trailing slash, e.g. `https://dd.weather.gc.ca`.
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    fn bulletin_url(&self, province: Province, code: &str, language: Language) -> String {
        format!(
            "{}/citypage_weather/xml/{}/{}_{}.xml",
            self.base_url,
            province.code(),
            code,
            language.bulletin_letter()
        )
    }

    /// Fetch one raw bulletin. No retries; a transient datamart failure
    /// surfaces to the caller and the next request tries again.
    pub async fn fetch_bulletin(
        &self,
        province: Province,
        code: &str,
        language: Language,
    ) -> Result<String, FetchError> {
        let url = self.bulletin_url(province, code, language);

        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }

        tracing::debug!("Fetching bulletin {}", url);
        let response = self.client.get(&url).headers(headers).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Upstream {
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
