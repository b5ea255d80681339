use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::error::FetchError;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT_VALUE: &str = "profile-stats";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Read-only access to the GitHub REST API, one JSON document per path.
pub trait Api {
    /// `path` is relative to the API root and may carry a query string.
    async fn get_json(&self, path: &str) -> Result<Value, FetchError>;
}

#[derive(Clone)]
pub struct GithubClient {
    token: Arc<String>,
    base_url: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            token: Arc::new(config.token.clone()),
            base_url: Arc::new(config.api_url.clone()),
            http: Arc::new(Client::new()),
        }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers
    }
}

impl Api for GithubClient {
    /// Single attempt: no retry, no backoff, reqwest's default timeouts.
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        info!("GET {path}");

        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .headers(Self::headers())
            .bearer_auth(&*self.token)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = resp.status();
        let rate_limited = resp
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        // GitHub also answers 403 once the rate limit is spent.
        let rejected = status == StatusCode::UNAUTHORIZED
            || (status == StatusCode::FORBIDDEN && !rate_limited);
        if rejected {
            return Err(FetchError::Unauthorized {
                path: path.to_string(),
                status,
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                path: path.to_string(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
