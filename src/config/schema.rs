//! Configuration schema for awsbastion
//!
//! Configuration is stored at `~/.config/awsbastion/config.toml`

use crate::error::{BastionError, BastionResult};
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Bastion account and target role
    pub bastion: BastionConfig,

    /// Credential cache settings
    pub cache: CacheConfig,

    /// Session validation settings
    pub probe: ProbeConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Bastion profile and main-account role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BastionConfig {
    /// Profile name in the shared AWS config holding the bastion user's keys
    pub profile: String,

    /// ARN of the role to assume in the main account
    pub role_arn: Option<String>,

    /// Region for STS and the main-account session
    pub region: Option<String>,

    /// Endpoint override for the main-account session
    pub endpoint_url: Option<String>,

    /// MFA device ARN (discovered from the bastion identity if unset)
    pub mfa_serial: Option<String>,

    /// Role session name passed to STS
    pub session_name: String,

    /// Requested credential lifetime
    pub duration_secs: i32,
}

impl Default for BastionConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            role_arn: None,
            region: None,
            endpoint_url: None,
            mfa_serial: None,
            session_name: crate::session::DEFAULT_SESSION_NAME.to_string(),
            duration_secs: crate::session::DEFAULT_DURATION_SECS,
        }
    }
}

impl BastionConfig {
    /// Build the per-call session input, requiring a target role
    pub fn to_session_config(&self) -> BastionResult<SessionConfig> {
        let role_arn = self
            .role_arn
            .clone()
            .filter(|arn| !arn.is_empty())
            .ok_or(BastionError::MissingSetting("bastion.role_arn"))?;

        Ok(SessionConfig {
            bastion_profile: self.profile.clone(),
            role_arn,
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            mfa_serial: self.mfa_serial.clone(),
            role_session_name: self.session_name.clone(),
            duration_secs: self.duration_secs,
        })
    }
}

/// Credential cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file location (defaults to `~/.awsbastion_session.json`)
    pub path: Option<PathBuf>,
}

/// Which probe validates a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    #[default]
    CallerIdentity,
    S3ListObjects,
}

/// Session validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub kind: ProbeKind,

    /// Bucket listed by the `s3_list_objects` probe
    pub bucket: Option<String>,

    /// Bucket region, if different from the session region
    pub region: Option<String>,
}
