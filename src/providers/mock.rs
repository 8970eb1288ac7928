/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::flaky(n)` - Fails the first n calls, then succeeds
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::auth_failing()` - Always fails with an auth error
 * - `MockProvider::slow(ms)` - Succeeds after a delay
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{Provider, TranslationRequest, TranslationResponse};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a marked-up translation
    Working,
    /// Fails the first `failures` calls with a 503, then succeeds
    Flaky { failures: usize },
    /// Always fails with a 500
    Failing,
    /// Always fails with an authentication error
    AuthFailing,
    /// Succeeds after a fixed delay (for timeout testing)
    Slow { delay_ms: u64 },
    /// Returns an empty response body
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Shared call counter, also drives flaky failures
    request_count: Arc<AtomicUsize>,
    /// Credit balance reported by `remaining_credit`
    credit: f64,
    /// Custom response generator (optional)
    custom_response: Option<fn(&TranslationRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            credit: 100.0,
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails its first `failures` calls, then recovers
    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::Flaky { failures })
    }

    /// Create a failing mock provider that always returns a 500
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that always fails authentication
    pub fn auth_failing() -> Self {
        Self::new(MockBehavior::AuthFailing)
    }

    /// Create a mock that answers after `delay_ms` milliseconds
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Override the reported credit balance
    pub fn with_credit(mut self, credit: f64) -> Self {
        self.credit = credit;
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&TranslationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            credit: self.credit,
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => {
                let text = if let Some(generator) = self.custom_response {
                    generator(&request)
                } else {
                    format!("[TRANSLATED] {}", request.text)
                };

                Ok(TranslationResponse {
                    text,
                    input_tokens: Some(request.text.len() as u64),
                    output_tokens: Some((request.text.len() / 2) as u64),
                })
            }

            MockBehavior::Flaky { failures } => {
                if count < failures {
                    Err(ProviderError::ServerError {
                        status: 503,
                        message: format!("simulated transient failure (call #{})", count + 1),
                    })
                } else {
                    Ok(TranslationResponse {
                        text: format!("[TRANSLATED] {}", request.text),
                        input_tokens: Some(10),
                        output_tokens: Some(10),
                    })
                }
            }

            MockBehavior::Failing => Err(ProviderError::ServerError {
                status: 500,
                message: "simulated provider failure".to_string(),
            }),

            MockBehavior::AuthFailing => Err(ProviderError::AuthFailed(
                "simulated invalid API key".to_string(),
            )),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(TranslationResponse {
                    text: format!("[TRANSLATED] {}", request.text),
                    input_tokens: Some(10),
                    output_tokens: Some(10),
                })
            }

            MockBehavior::Empty => Ok(TranslationResponse {
                text: String::new(),
                input_tokens: Some(0),
                output_tokens: Some(0),
            }),
        }
    }

    async fn remaining_credit(&self) -> Result<f64, ProviderError> {
        match self.behavior {
            MockBehavior::AuthFailing => Err(ProviderError::AuthFailed(
                "simulated invalid API key".to_string(),
            )),
            MockBehavior::Failing => Err(ProviderError::Connection(
                "simulated balance endpoint outage".to_string(),
            )),
            _ => Ok(self.credit),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ServerError {
                status: 500,
                message: "simulated provider failure".to_string(),
            }),
            MockBehavior::AuthFailing => Err(ProviderError::AuthFailed(
                "simulated invalid API key".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
