//! Error types for awsbastion
//!
//! All modules use `BastionResult<T>` as their return type. Stage-specific
//! failures (cache, exchange, probe) have their own enums so the session
//! orchestrator can decide which ones are recoverable.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for awsbastion operations
pub type BastionResult<T> = Result<T, BastionError>;

/// All errors that can surface from an acquisition or a CLI command
#[derive(Error, Debug)]
pub enum BastionError {
    // Pipeline stages
    #[error("cache: {0}")]
    Cache(#[from] CacheError),

    #[error("exchange: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("validation failed after {attempts} attempt(s): {source}")]
    Validation {
        attempts: u32,
        #[source]
        source: ProbeError,
    },

    #[error("config: cannot build session for main account: {0}")]
    SessionConfig(String),

    // Configuration file errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Failures of the on-disk credential record
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("no cached credential at {0}")]
    NotFound(PathBuf),

    #[error("cached credential at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the bastion-to-role exchange
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("could not establish identity for profile {profile}: {reason}")]
    Identity { profile: String, reason: String },

    #[error("cannot determine MFA device: {0}")]
    MfaDevice(String),

    #[error("invalid MFA token code: {0}")]
    MfaInput(String),

    #[error("MFA prompt failed: {0}")]
    MfaPrompt(String),

    #[error("assuming role {role_arn} was denied: {reason}")]
    AssumeRole { role_arn: String, reason: String },

    #[error("STS returned no credentials for role {0}")]
    NoCredentials(String),
}

/// A probe's verdict that a session is not usable
#[derive(Error, Debug)]
#[error("{probe} probe failed: {reason}")]
pub struct ProbeError {
    pub probe: &'static str,
    pub reason: String,
}

impl ProbeError {
    pub fn new(probe: &'static str, reason: impl Into<String>) -> Self {
        Self {
            probe,
            reason: reason.into(),
        }
    }
}

impl BastionError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Exchange(ExchangeError::Identity { .. }) => {
                Some("Check the bastion profile in ~/.aws/credentials, or run: aws configure --profile <name>")
            }
            Self::Exchange(ExchangeError::MfaDevice(_)) => {
                Some("Pass the MFA device ARN with --mfa-serial")
            }
            Self::Exchange(ExchangeError::AssumeRole { .. }) => {
                Some("Verify the role ARN and that its trust policy allows the bastion user with MFA")
            }
            Self::Validation { .. } => {
                Some("Fresh credentials were rejected too; check the role permissions and the probe target")
            }
            Self::Cache(CacheError::Io { .. }) => Some("Run: awsbastion purge"),
            Self::MissingSetting(_) => Some("Run: awsbastion config init, then edit the [bastion] section"),
            _ => None,
        }
    }
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for failures that only mean "nothing usable is cached"
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Corrupt { .. })
    }
}
