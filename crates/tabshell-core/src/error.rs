//! Engine error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    // ─────────────────────────────────────────────────────────────
    // Tab Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Unusable navigation target: {reference:?}")]
    InvalidTarget { reference: String },

    #[error("A tab with identity '{identity}' is already open")]
    DuplicateIdentity { identity: String },

    #[error("No tab with identity '{identity}'")]
    NotFound { identity: String },

    // ─────────────────────────────────────────────────────────────
    // Document Contract Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Required element not found: {selector}")]
    MissingElement { selector: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn invalid_target(reference: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reference: reference.into(),
        }
    }

    pub fn duplicate_identity(identity: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            identity: identity.into(),
        }
    }

    pub fn not_found(identity: impl Into<String>) -> Self {
        Self::NotFound {
            identity: identity.into(),
        }
    }

    pub fn missing_element(selector: impl Into<String>) -> Self {
        Self::MissingElement {
            selector: selector.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }

    /// Errors that handlers swallow: a click racing a closure, an unusable
    /// link, or a reuse of an already open tab. They never reach the host page.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Error::InvalidTarget { .. } | Error::DuplicateIdentity { .. } | Error::NotFound { .. }
        )
    }

    /// Check if this error should stop the engine from starting
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MissingElement { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
