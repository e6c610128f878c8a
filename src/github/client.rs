// GitHub API HTTP client.
// Handles authentication, rate limiting, and request/response processing.

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{OrgtopError, Result};

use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with optional authentication and rate limit tracking.
///
/// Without a token, requests run against the unauthenticated quota (60/hour),
/// which is usually enough for a small organization but not a large one.
pub struct GitHubClient {
    client: Client,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a new GitHub client, authenticated when a token is given.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| OrgtopError::Other(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("orgtop-cli"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(OrgtopError::Api)?;

        Ok(Self {
            client,
            rate_limit: RateLimit::default(),
        })
    }

    /// Create a client from the GITHUB_TOKEN environment variable, falling
    /// back to an unauthenticated client when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var("GITHUB_TOKEN") {
            Ok(token) => Self::new(Some(&token)),
            Err(_) => {
                tracing::warn!("GITHUB_TOKEN not set, using unauthenticated rate limits");
                Self::new(None)
            }
        }
    }

    /// Make a GET request to the GitHub API.
    pub async fn get(&mut self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", GITHUB_API_BASE, endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(OrgtopError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", GITHUB_API_BASE, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(OrgtopError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        if let Some(limit) = header_value(response, "x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header_value(response, "x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_value(response, "x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(OrgtopError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(OrgtopError::NotFound(url))
            }
            StatusCode::FORBIDDEN => {
                // A 403 with an exhausted quota is a rate limit, anything else
                // is a plain permission failure.
                if self.rate_limit.remaining == 0 {
                    let reset_at =
                        chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
                            .map(|dt| dt.format("%H:%M:%S").to_string())
                            .unwrap_or_else(|| "unknown".to_string());
                    Err(OrgtopError::RateLimited { reset_at })
                } else {
                    Err(OrgtopError::Other(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    )))
                }
            }
            status => Err(OrgtopError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}

fn header_value(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
