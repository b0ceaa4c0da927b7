//! # Error Types Module
//!
//! Defines the error taxonomy for the generation client and startup
//! configuration. Remote failures are deliberately collapsed into two
//! variants: the only distinction worth surfacing to an end user is
//! "your credential was rejected" versus "something else went wrong".

/// Errors returned by the generation client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend rejected the supplied API key (HTTP 401)
    Auth,
    /// Any other remote failure: network, non-success status, malformed
    /// response, or a response without the expected payload
    Processing(String),
}

impl GenerationError {
    /// Fixed user-facing message for this error, distinct per variant.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::Auth => "🔑 Invalid API Key",
            GenerationError::Processing(_) => "⚠️ Processing Error",
        }
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Auth => write!(f, "authorization rejected by generation backend"),
            GenerationError::Processing(msg) => write!(f, "generation failed: {msg}"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Fatal startup configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required environment variable is missing
    MissingVar(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "required environment variable {name} is not set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
