use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::CorrectionError;
use crate::grammar::Corrector;

/// LanguageTool client for the `/v2/check` endpoint
#[derive(Debug)]
pub struct LanguageTool {
    /// Base URL of the LanguageTool server
    base_url: String,
    /// LanguageTool language code (e.g. "en-US")
    language: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Check response from the LanguageTool API
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Detected problems, in text order
    #[serde(default)]
    pub matches: Vec<RuleMatch>,
}

/// A single problem reported by LanguageTool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Explanation of the problem
    #[serde(default)]
    pub message: String,
    /// Offset of the problem in UTF-16 code units
    pub offset: usize,
    /// Length of the problem in UTF-16 code units
    pub length: usize,
    /// Suggested replacements, best first
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

/// A suggested replacement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub value: String,
}

/// Applies the first suggestion of every match to the text
///
/// Offsets are UTF-16 code unit positions. Matches without suggestions,
/// matches reaching past the end of the text and matches overlapping an
/// earlier one are skipped.
pub fn apply_matches(text: &str, matches: &[RuleMatch]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut ordered: Vec<&RuleMatch> = matches
        .iter()
        .filter(|m| {
            !m.replacements.is_empty() && m.offset.checked_add(m.length).is_some_and(|end| end <= units.len())
        })
        .collect();
    ordered.sort_by_key(|m| m.offset);

    let mut output: Vec<u16> = Vec::with_capacity(units.len());
    let mut cursor = 0;
    for rule_match in ordered {
        if rule_match.offset < cursor {
            debug!("Skipping overlapping correction at offset {}", rule_match.offset);
            continue;
        }
        output.extend_from_slice(&units[cursor..rule_match.offset]);
        output.extend(rule_match.replacements[0].value.encode_utf16());
        cursor = rule_match.offset + rule_match.length;
    }
    output.extend_from_slice(&units[cursor..]);

    String::from_utf16_lossy(&output)
}

impl LanguageTool {
    /// Create a new client for the given server and language
    pub fn new(endpoint: &str, language: impl Into<String>, timeout: Duration) -> Result<Self, CorrectionError> {
        let url = Url::parse(endpoint)
            .map_err(|e| CorrectionError::Unavailable(format!("Invalid LanguageTool endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| CorrectionError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            language: language.into(),
            client,
            max_retries: 2,
            backoff_base_ms: 500,
        })
    }

    /// Set retry parameters
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Check the text and return the raw matches
    pub async fn check(&self, text: &str) -> Result<CheckResponse, CorrectionError> {
        let url = format!("{}/v2/check", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            if attempt > 0 {
                let delay_ms = self.backoff_base_ms * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let response_result = self
                .client
                .post(&url)
                .form(&[("text", text), ("language", self.language.as_str())])
                .send()
                .await;

            match response_result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<CheckResponse>()
                            .await
                            .map_err(|e| CorrectionError::ParseError(e.to_string()));
                    }

                    let message = response.text().await.unwrap_or_default();
                    let err = CorrectionError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };

                    // Client errors will not succeed on retry
                    if status.is_client_error() && status.as_u16() != 429 {
                        error!("LanguageTool rejected the request: {}", err);
                        return Err(err);
                    }
                    warn!("LanguageTool request failed (attempt {}): {}", attempt + 1, err);
                    last_error = Some(err);
                }
                Err(e) => {
                    let err = if e.is_timeout() {
                        CorrectionError::RequestFailed(format!("request timed out: {}", e))
                    } else if e.is_connect() {
                        CorrectionError::Unavailable(e.to_string())
                    } else {
                        CorrectionError::RequestFailed(e.to_string())
                    };
                    warn!("LanguageTool request failed (attempt {}): {}", attempt + 1, err);
                    last_error = Some(err);
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or_else(|| CorrectionError::RequestFailed("no attempt was made".to_string())))
    }

    /// Test the connection to the server
    pub async fn test_connection(&self) -> Result<(), CorrectionError> {
        let url = format!("{}/v2/languages", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CorrectionError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CorrectionError::ApiError {
                status_code: response.status().as_u16(),
                message: "LanguageTool server is not ready".to_string(),
            })
        }
    }
}

#[async_trait]
impl Corrector for LanguageTool {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let response = self.check(text).await?;
        Ok(apply_matches(text, &response.matches))
    }
}
