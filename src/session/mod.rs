//! Main-account sessions
//!
//! [`Bastion::acquire`] turns a [`SessionConfig`] into a validated
//! [`MainSession`], reusing the cached credential when it still works.

mod orchestrator;

pub use orchestrator::{session, session_with_config, Bastion, MAX_VALIDATION_ATTEMPTS};

use crate::credentials::TemporaryCredential;
use crate::error::{BastionError, BastionResult};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use std::time::SystemTime;

/// Region used when neither the caller nor the profile picks one
pub const DEFAULT_REGION: &str = "us-east-1";

pub const DEFAULT_SESSION_NAME: &str = "awsbastion-session";

pub const DEFAULT_DURATION_SECS: i32 = 3600;

const PROVIDER_NAME: &str = "awsbastion";

/// Caller-supplied input for one acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Shared-config profile of the bastion user
    pub bastion_profile: String,

    /// Role to assume in the main account
    pub role_arn: String,

    pub region: Option<String>,

    pub endpoint_url: Option<String>,

    /// MFA device ARN; discovered from the bastion identity when `None`
    pub mfa_serial: Option<String>,

    pub role_session_name: String,

    pub duration_secs: i32,
}

impl SessionConfig {
    pub fn new(bastion_profile: impl Into<String>, role_arn: impl Into<String>) -> Self {
        Self {
            bastion_profile: bastion_profile.into(),
            role_arn: role_arn.into(),
            region: None,
            endpoint_url: None,
            mfa_serial: None,
            role_session_name: DEFAULT_SESSION_NAME.to_string(),
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_mfa_serial(mut self, serial: impl Into<String>) -> Self {
        self.mfa_serial = Some(serial.into());
        self
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }
}

/// Ready-to-use handle on the main account
///
/// Build SDK clients from [`MainSession::sdk_config`].
#[derive(Debug, Clone)]
pub struct MainSession {
    sdk_config: SdkConfig,
    credential: TemporaryCredential,
    region: String,
}

impl MainSession {
    /// Combine a credential with the base configuration
    pub fn build(config: &SessionConfig, credential: TemporaryCredential) -> BastionResult<Self> {
        if credential.access_key_id.is_empty() || credential.secret_access_key.is_empty() {
            return Err(BastionError::SessionConfig(
                "credential has an empty access key".to_string(),
            ));
        }

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        if region.trim().is_empty() {
            return Err(BastionError::SessionConfig("region is empty".to_string()));
        }

        let provider = Credentials::new(
            credential.access_key_id.clone(),
            credential.secret_access_key.clone(),
            Some(credential.session_token.clone()).filter(|t| !t.is_empty()),
            credential.expiration.map(SystemTime::from),
            PROVIDER_NAME,
        );

        let mut builder = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(provider));

        if let Some(url) = &config.endpoint_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(BastionError::SessionConfig(format!(
                    "endpoint override {} is not an http(s) URL",
                    url
                )));
            }
            builder = builder.endpoint_url(url.clone());
        }

        Ok(Self {
            sdk_config: builder.build(),
            credential,
            region,
        })
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    pub fn credential(&self) -> &TemporaryCredential {
        &self.credential
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> TemporaryCredential {
        TemporaryCredential::new("ASIAEXAMPLE", "secret", "token", None)
    }

    #[test]
    fn build_defaults_region() {
        let config = SessionConfig::new("bastion", "arn:aws:iam::210987654321:role/admin");
        let session = MainSession::build(&config, credential()).unwrap();

        assert_eq!(session.region(), DEFAULT_REGION);
        assert_eq!(
            session.sdk_config().region().map(|r| r.to_string()),
            Some(DEFAULT_REGION.to_string())
        );
        assert!(session.sdk_config().credentials_provider().is_some());
    }

    #[test]
    fn build_keeps_overrides() {
        let config = SessionConfig::new("bastion", "arn:aws:iam::210987654321:role/admin")
            .with_region("eu-central-1")
            .with_endpoint_url("http://localhost:4566");
        let session = MainSession::build(&config, credential()).unwrap();

        assert_eq!(session.region(), "eu-central-1");
        assert_eq!(session.sdk_config().endpoint_url(), Some("http://localhost:4566"));
        assert_eq!(session.credential().access_key_id, "ASIAEXAMPLE");
    }

    #[test]
    fn build_rejects_bad_input() {
        let config = SessionConfig::new("bastion", "arn:aws:iam::210987654321:role/admin");
        let empty = TemporaryCredential::new("", "", "", None);
        assert!(matches!(
            MainSession::build(&config, empty),
            Err(BastionError::SessionConfig(_))
        ));

        let config = config.with_endpoint_url("localhost:4566");
        let err = MainSession::build(&config, credential()).unwrap_err();
        assert!(err.to_string().starts_with("config:"));
    }
}
