//! Bastion-to-role exchange through AWS STS

use super::{CredentialStore, TemporaryCredential, TokenProvider};
use crate::error::{BastionResult, ExchangeError};
use crate::session::{SessionConfig, DEFAULT_REGION};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client as StsClient;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Trades the bastion identity plus an MFA code for a role credential
#[async_trait]
pub trait RoleExchanger: Send + Sync {
    async fn exchange(
        &self,
        config: &SessionConfig,
    ) -> Result<TemporaryCredential, ExchangeError>;
}

/// Exchange, then persist before handing the credential back
pub async fn derive(
    exchanger: &dyn RoleExchanger,
    store: &dyn CredentialStore,
    config: &SessionConfig,
) -> BastionResult<TemporaryCredential> {
    let credential = exchanger.exchange(config).await?;
    store.store(&credential).await?;
    info!(
        "Derived credential {} for {} (cached at {})",
        credential.access_key_id,
        config.role_arn,
        store.location()
    );
    Ok(credential)
}

/// `sts:AssumeRole` with MFA, authenticated as the bastion profile
pub struct StsExchanger<P> {
    tokens: P,
}

impl<P: TokenProvider> StsExchanger<P> {
    pub fn new(tokens: P) -> Self {
        Self { tokens }
    }

    async fn bastion_config(config: &SessionConfig) -> SdkConfig {
        let loader = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(&config.bastion_profile);

        if let Some(region) = &config.region {
            return loader.region(Region::new(region.clone())).load().await;
        }

        // Priority: ENV vars -> profile -> DEFAULT_REGION
        let loaded = loader.load().await;
        match loaded.region() {
            Some(region) => {
                debug!("Using region: {}", region);
                loaded
            }
            None => {
                debug!(
                    "No region configured, using default {} for STS",
                    DEFAULT_REGION
                );
                aws_config::defaults(BehaviorVersion::latest())
                    .profile_name(&config.bastion_profile)
                    .region(Region::new(DEFAULT_REGION))
                    .load()
                    .await
            }
        }
    }
}

#[async_trait]
impl<P: TokenProvider> RoleExchanger for StsExchanger<P> {
    async fn exchange(
        &self,
        config: &SessionConfig,
    ) -> Result<TemporaryCredential, ExchangeError> {
        info!(
            "Assuming {} from bastion profile {}",
            config.role_arn, config.bastion_profile
        );

        let client = StsClient::new(&Self::bastion_config(config).await);

        let identity = client.get_caller_identity().send().await.map_err(|e| {
            ExchangeError::Identity {
                profile: config.bastion_profile.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            }
        })?;
        debug!("Bastion identity: {:?}", identity.arn());

        let mfa_serial = match &config.mfa_serial {
            Some(serial) => serial.clone(),
            None => {
                let arn = identity.arn().ok_or_else(|| {
                    ExchangeError::MfaDevice("GetCallerIdentity returned no ARN".to_string())
                })?;
                mfa_serial_for_user(arn)?
            }
        };

        let token_code = self.tokens.token_code(&mfa_serial).await?;

        let response = client
            .assume_role()
            .role_arn(&config.role_arn)
            .role_session_name(&config.role_session_name)
            .serial_number(&mfa_serial)
            .token_code(token_code)
            .duration_seconds(config.duration_secs)
            .send()
            .await
            .map_err(|e| ExchangeError::AssumeRole {
                role_arn: config.role_arn.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let sts_creds = response
            .credentials()
            .ok_or_else(|| ExchangeError::NoCredentials(config.role_arn.clone()))?;

        let expires = sts_creds.expiration();
        let expiration = DateTime::<Utc>::from_timestamp(expires.secs(), expires.subsec_nanos());

        Ok(TemporaryCredential::new(
            sts_creds.access_key_id(),
            sts_creds.secret_access_key(),
            sts_creds.session_token(),
            expiration,
        ))
    }
}

/// Virtual MFA device ARN for an IAM user ARN
///
/// `arn:aws:iam::123456789012:user/ops/alice` maps to
/// `arn:aws:iam::123456789012:mfa/alice`.
pub fn mfa_serial_for_user(user_arn: &str) -> Result<String, ExchangeError> {
    let parts: Vec<&str> = user_arn.splitn(6, ':').collect();
    match parts.as_slice() {
        ["arn", partition, "iam", "", account, resource] if resource.starts_with("user/") => {
            let name = resource.rsplit('/').next().unwrap_or_default();
            if name.is_empty() {
                return Err(ExchangeError::MfaDevice(format!(
                    "no user name in {}",
                    user_arn
                )));
            }
            Ok(format!("arn:{}:iam::{}:mfa/{}", partition, account, name))
        }
        _ => Err(ExchangeError::MfaDevice(format!(
            "bastion identity {} is not an IAM user",
            user_arn
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryStore;
    use crate::error::BastionError;

    struct FixedExchanger(Result<TemporaryCredential, ()>);

    #[async_trait]
    impl RoleExchanger for FixedExchanger {
        async fn exchange(
            &self,
            config: &SessionConfig,
        ) -> Result<TemporaryCredential, ExchangeError> {
            self.0.clone().map_err(|_| ExchangeError::AssumeRole {
                role_arn: config.role_arn.clone(),
                reason: "AccessDenied".to_string(),
            })
        }
    }

    fn session_config() -> SessionConfig {
        SessionConfig::new("bastion", "arn:aws:iam::210987654321:role/admin")
    }

    #[test]
    fn mfa_serial_from_user_arn() {
        assert_eq!(
            mfa_serial_for_user("arn:aws:iam::123456789012:user/alice").unwrap(),
            "arn:aws:iam::123456789012:mfa/alice"
        );
        assert_eq!(
            mfa_serial_for_user("arn:aws-us-gov:iam::123456789012:user/ops/bob").unwrap(),
            "arn:aws-us-gov:iam::123456789012:mfa/bob"
        );
    }

    #[test]
    fn mfa_serial_rejects_non_users() {
        assert!(matches!(
            mfa_serial_for_user("arn:aws:sts::123456789012:assumed-role/dev/session"),
            Err(ExchangeError::MfaDevice(_))
        ));
        assert!(mfa_serial_for_user("arn:aws:iam::123456789012:user/").is_err());
        assert!(mfa_serial_for_user("not-an-arn").is_err());
    }

    #[tokio::test]
    async fn derive_persists_before_returning() {
        let cred = TemporaryCredential::new("ASIADERIVED", "secret", "token", None);
        let store = MemoryStore::new();

        let derived = derive(&FixedExchanger(Ok(cred.clone())), &store, &session_config())
            .await
            .unwrap();

        assert_eq!(derived, cred);
        assert_eq!(store.snapshot().await, Some(cred));
    }

    #[tokio::test]
    async fn derive_failure_leaves_cache_alone() {
        let store = MemoryStore::new();

        let err = derive(&FixedExchanger(Err(())), &store, &session_config())
            .await
            .unwrap_err();

        assert!(matches!(err, BastionError::Exchange(ExchangeError::AssumeRole { .. })));
        assert!(store.snapshot().await.is_none());
    }
}
