/*!
 * Mock corrector implementations for testing.
 *
 * This module provides a mock correction engine that simulates different behaviors:
 * - `MockCorrector::working()` - Always succeeds (upper-cases the text)
 * - `MockCorrector::failing()` - Always fails with an error
 * - `MockCorrector::failing_on(text)` - Fails only for one specific input
 * - `MockCorrector::empty()` - Answers with blank text
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::CorrectionError;
use crate::grammar::Corrector;

/// Behavior mode for the mock corrector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails when the input equals the given text, succeeds otherwise
    FailingOn(&'static str),
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns whitespace only
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock corrector for testing realignment behavior
#[derive(Debug)]
pub struct MockCorrector {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom correction function (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockCorrector {
    /// Create a new mock corrector with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock corrector that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock corrector that fails for one specific input
    pub fn failing_on(text: &'static str) -> Self {
        Self::new(MockBehavior::FailingOn(text))
    }

    /// Create an intermittently failing mock corrector
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock corrector that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns blank responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom correction function used when a call succeeds
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of correction calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn succeed(&self, text: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text),
            None => text.to_uppercase(),
        }
    }
}

impl Clone for MockCorrector {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Corrector for MockCorrector {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(self.succeed(text)),

            MockBehavior::FailingOn(target) => {
                if text == target {
                    Err(CorrectionError::ApiError {
                        status_code: 500,
                        message: format!("Simulated failure for '{}'", text),
                    })
                } else {
                    Ok(self.succeed(text))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(CorrectionError::Unavailable(format!(
                        "Simulated intermittent failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.succeed(text))
                }
            }

            MockBehavior::Failing => Err(CorrectionError::Unavailable(
                "Simulated correction engine outage".to_string(),
            )),

            MockBehavior::Empty => Ok("   ".to_string()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.succeed(text))
            }
        }
    }
}
