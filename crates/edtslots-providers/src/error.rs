//! Error types for event source operations.
//!
//! Every failure to obtain a calendar is reported as a [`ProviderError`];
//! an empty calendar is a successful fetch with no events, never an error.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The calendar identity is not part of the configured enumeration.
    UnknownIdentity,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Server returned an error (5xx status codes).
    ServerError,
    /// Resource not found (404).
    NotFound,
    /// The payload is not a parsable calendar.
    InvalidResponse,
    /// The server answered with an empty body.
    EmptyPayload,
    /// Configuration error - missing or invalid config.
    ConfigurationError,
    /// Internal provider error - unexpected state, bug.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns true if the source could not deliver a usable calendar.
    ///
    /// Unknown identities and configuration mistakes are caller errors and
    /// are not counted as source unavailability.
    pub fn is_source_unavailable(&self) -> bool {
        !matches!(self, Self::UnknownIdentity | Self::ConfigurationError)
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownIdentity => "unknown_identity",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::InvalidResponse => "invalid_response",
            Self::EmptyPayload => "empty_payload",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while fetching a calendar.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The source that generated this error (e.g., "ade").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an unknown identity error.
    pub fn unknown_identity(identity: impl AsRef<str>) -> Self {
        Self::new(
            ProviderErrorCode::UnknownIdentity,
            format!("'{}' is not a monitored calendar", identity.as_ref()),
        )
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates an empty payload error.
    pub fn empty_payload(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::EmptyPayload, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if the source could not deliver a usable calendar.
    pub fn is_source_unavailable(&self) -> bool {
        self.code.is_source_unavailable()
    }

    /// Returns true if the identity is not part of the configured enumeration.
    pub fn is_unknown_identity(&self) -> bool {
        self.code == ProviderErrorCode::UnknownIdentity
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
