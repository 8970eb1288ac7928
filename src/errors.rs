/*!
 * Error types for the pdflingo pipeline.
 *
 * This module contains custom error types for each pipeline stage,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors returned by the remote translation service client
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails at the transport level
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The service rejected the request for rate-limiting reasons
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// A request attempt exceeded its timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// 5xx-class error from the service
    #[error("Service error ({status}): {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Authentication or authorization failure
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The service rejected the request as malformed
    #[error("Malformed request ({status}): {message}")]
    MalformedRequest {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },
}

impl ProviderError {
    /// Whether the error is worth retrying with backoff.
    ///
    /// Rate limiting, timeouts, transport failures, and 5xx responses are
    /// transient; auth failures and malformed requests are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Timeout(_) | Self::ServerError { .. } | Self::Connection(_)
        )
    }

    /// Whether the error poisons the whole run.
    ///
    /// An authentication failure will repeat identically on every subsequent
    /// call, so the orchestrator stops dispatching once it sees one.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthFailed(_))
    }
}

/// Errors that can occur during PDF extraction
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Both the primary and the fallback engine failed
    #[error("both extraction engines failed, PDF may be encrypted or severely corrupted (primary: {primary}; fallback: {fallback})")]
    BothEnginesFailed {
        /// Failure reason from the primary engine
        primary: String,
        /// Failure reason from the fallback engine
        fallback: String,
    },

    /// The document contains no extractable pages
    #[error("document contains no pages")]
    EmptyDocument,
}

/// Errors that can occur during chunking
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Word budget must be a positive number
    #[error("invalid word budget: {0} (must be at least 1)")]
    InvalidBudget(usize),
}

/// Errors that can occur during cost estimation
#[derive(Error, Debug)]
pub enum EstimationError {
    /// Model identifier missing from the pricing table
    #[error("unknown model: {0} (not present in pricing table)")]
    UnknownModel(String),

    /// The credit/balance endpoint could not be reached
    #[error("translation service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Per-chunk translation failure, classified by retry eligibility
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// Transient failure that exhausted its retry budget
    #[error("transient failure after {retries_used} retries: {source}")]
    Transient {
        /// The last provider error observed
        source: ProviderError,
        /// Number of retries consumed before giving up
        retries_used: u32,
    },

    /// Non-retryable failure
    #[error("fatal failure: {source}")]
    Fatal {
        /// The provider error
        source: ProviderError,
    },

    /// The chunk was never dispatched because a fatal error halted the run
    #[error("not dispatched: run halted by a fatal error")]
    NotDispatched,
}

impl TranslationError {
    /// Whether this failure halts dispatch of the remaining chunks.
    pub fn halts_run(&self) -> bool {
        matches!(self, Self::Fatal { source } if source.is_fatal())
    }
}

/// Errors that can occur while assembling the output document
#[derive(Error, Debug)]
pub enum BuildError {
    /// The translated sequence has a gap or duplicate
    #[error("incomplete input: expected sequence index {expected}, found {found}")]
    IncompleteInput {
        /// The index the builder expected next
        expected: usize,
        /// The index it found instead
        found: usize,
    },

    /// No translated chunks were supplied
    #[error("no translated chunks to build from")]
    EmptyInput,

    /// No font resource covers the target language's script
    #[error("unsupported script for target language: {0}")]
    UnsupportedScript(String),
}

/// Main application error type that wraps all stage errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from PDF extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from chunking
    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Error from cost estimation
    #[error("Estimation error: {0}")]
    Estimation(#[from] EstimationError),

    /// Error from the provider client
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document building
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
