//! HTTP client for the Fastprint endpoint: response inspection and the
//! candidate login prober.
//!
//! One `reqwest::Client` (cookie jar, connection reuse) is shared by the
//! initial GET and every login POST, so any session cookie the service
//! sets survives across attempts.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::credentials::Credentials;
use crate::hints::{self, ResponseHints};
use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Response is missing the Date header")]
    MissingDateHeader,
    #[error("Could not parse Date header {raw:?}: {source}")]
    InvalidDateHeader {
        raw: String,
        source: chrono::ParseError,
    },
    #[error("All {0} login candidates were rejected")]
    AllCandidatesRejected(usize),
}

/// Username the API accepted plus the decoded payload that came with it.
#[derive(Debug)]
pub struct LoginSuccess {
    pub username: String,
    pub response: ApiResponse,
}

pub struct ApiClient {
    client: Client,
    endpoint: String,
    gmt_offset_hours: i64,
}

impl ApiClient {
    pub fn new(api: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: api.endpoint.clone(),
            gmt_offset_hours: api.gmt_offset_hours,
        })
    }

    /// GET the endpoint and inspect headers, cookies and body for auth
    /// hints. Fails when the request itself fails or the Date header is
    /// missing or malformed.
    pub async fn inspect(&self) -> Result<ResponseHints, ApiError> {
        let response = self.client.get(&self.endpoint).send().await?;
        tracing::info!(status = %response.status(), "GET {}", self.endpoint);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        for (name, value) in &headers {
            tracing::info!("  {name}: {value}");
        }
        let header_suffix = hints::find_suffix_hint(
            "header",
            headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );

        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect();
        if cookies.is_empty() {
            tracing::info!("No cookies in response");
        }
        for (name, value) in &cookies {
            tracing::info!("  cookie {name}: {value}");
        }
        let cookie_suffix = hints::find_suffix_hint(
            "cookie",
            cookies
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );

        let raw_date = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("date"))
            .map(|(_, value)| value.clone())
            .ok_or(ApiError::MissingDateHeader)?;

        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            tracing::info!("Empty response body");
        } else {
            let (format, mentions_suffix) = hints::inspect_body(&body);
            tracing::info!(
                bytes = body.len(),
                format = ?format,
                mentions_suffix,
                "Response body analyzed"
            );
        }

        let server_time = hints::parse_server_date(&raw_date, self.gmt_offset_hours)
            .map_err(|source| ApiError::InvalidDateHeader {
                raw: raw_date.clone(),
                source,
            })?;
        tracing::info!(
            raw = %raw_date,
            offset_hours = self.gmt_offset_hours,
            server_time = %server_time,
            "Server time derived from Date header"
        );

        Ok(ResponseHints {
            server_time,
            header_suffix,
            cookie_suffix,
        })
    }

    /// Try each candidate in priority order, stopping at the first one
    /// the API accepts. Individual failures (network, non-200, bad body,
    /// business rejection) are logged and the next candidate is tried.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginSuccess, ApiError> {
        let total = credentials.candidates.len();

        for (index, candidate) in credentials.candidates.iter().enumerate() {
            tracing::info!(
                attempt = index + 1,
                total,
                strategy = candidate.strategy,
                username = %candidate.username,
                "Trying login candidate"
            );

            let request = self.client.post(&self.endpoint).form(&[
                ("username", candidate.username.as_str()),
                ("password", credentials.password_hash.as_str()),
            ]);

            let response = match request.send().await {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(strategy = candidate.strategy, "Request failed: {error}");
                    continue;
                }
            };

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let decoded: Option<ApiResponse> = serde_json::from_str(&body).ok();

            if status != StatusCode::OK {
                let message = decoded
                    .as_ref()
                    .map(|rejection| rejection.rejection_message().to_string())
                    .unwrap_or_else(|| format!("HTTP {status}"));
                tracing::warn!(strategy = candidate.strategy, "Rejected: {message}");
                continue;
            }

            match decoded {
                Some(response) if response.is_success() => {
                    tracing::info!(
                        strategy = candidate.strategy,
                        username = %candidate.username,
                        "Login accepted"
                    );
                    return Ok(LoginSuccess {
                        username: candidate.username.clone(),
                        response,
                    });
                }
                Some(response) => {
                    tracing::warn!(
                        strategy = candidate.strategy,
                        "Rejected: {}",
                        response.rejection_message()
                    );
                }
                None => {
                    tracing::warn!(strategy = candidate.strategy, "Unparseable response body");
                }
            }
        }

        Err(ApiError::AllCandidatesRejected(total))
    }
}
