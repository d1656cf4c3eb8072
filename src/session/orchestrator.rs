//! Cache-first session acquisition with a single purge-and-rederive retry

use super::{MainSession, SessionConfig};
use crate::config::ConfigManager;
use crate::credentials::exchange::derive;
use crate::credentials::{
    CredentialStore, FileStore, RoleExchanger, StdinTokenProvider, StsExchanger,
    TemporaryCredential,
};
use crate::error::{BastionError, BastionResult};
use crate::probe::{CallerIdentityProbe, Probe};
use crate::ui::UiContext;
use tracing::{debug, info, warn};

/// Probe attempts per acquisition: the cached (or first derived) credential,
/// then one freshly derived after a purge.
pub const MAX_VALIDATION_ATTEMPTS: u32 = 2;

/// Session orchestrator over a credential store and a role exchanger
pub struct Bastion {
    store: Box<dyn CredentialStore>,
    exchanger: Box<dyn RoleExchanger>,
}

impl Bastion {
    pub fn new(
        store: impl CredentialStore + 'static,
        exchanger: impl RoleExchanger + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            exchanger: Box::new(exchanger),
        }
    }

    /// File cache at `path`, STS exchange with a terminal MFA prompt
    pub fn interactive(path: impl Into<std::path::PathBuf>, ctx: UiContext) -> Self {
        Self::new(
            FileStore::new(path),
            StsExchanger::new(StdinTokenProvider::new(ctx)),
        )
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Get a validated session for the main account
    ///
    /// The cached credential is tried first. A probe failure purges the cache
    /// and derives a fresh credential exactly once; a second failure is fatal.
    /// Any other error ends the call immediately.
    pub async fn acquire(
        &self,
        config: &SessionConfig,
        probe: &dyn Probe,
    ) -> BastionResult<MainSession> {
        let mut candidate = self.cached().await;
        let mut attempt = 1;

        loop {
            let credential = match candidate.take() {
                Some(credential) => credential,
                None => derive(self.exchanger.as_ref(), self.store.as_ref(), config).await?,
            };

            let session = MainSession::build(config, credential)?;

            match probe.check(&session).await {
                Ok(()) => {
                    debug!("Session validated on attempt {}", attempt);
                    return Ok(session);
                }
                Err(source) if attempt >= MAX_VALIDATION_ATTEMPTS => {
                    return Err(BastionError::Validation {
                        attempts: attempt,
                        source,
                    });
                }
                Err(source) => {
                    warn!("Session rejected ({}), purging cached credential", source);
                    self.store.purge().await?;
                    attempt += 1;
                }
            }
        }
    }

    /// Cached credential, or `None` for any kind of miss
    async fn cached(&self) -> Option<TemporaryCredential> {
        match self.store.load().await {
            Ok(credential) if credential.is_expired() => {
                info!("Cached credential {} has expired", credential.access_key_id);
                None
            }
            Ok(credential) => {
                debug!("Using cached credential {}", credential.access_key_id);
                Some(credential)
            }
            Err(e) if e.is_miss() => {
                debug!("Cache miss: {}", e);
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable cache: {}", e);
                None
            }
        }
    }
}

/// Session for `role_arn` from `profile` with default settings
pub async fn session(profile: &str, role_arn: &str) -> BastionResult<MainSession> {
    session_with_config(&SessionConfig::new(profile, role_arn), &CallerIdentityProbe).await
}

/// Session with a custom configuration and probe, cached at the default path
pub async fn session_with_config(
    config: &SessionConfig,
    probe: &dyn Probe,
) -> BastionResult<MainSession> {
    let path = ConfigManager::cache_path(None, &Default::default());
    Bastion::interactive(path, UiContext::detect())
        .acquire(config, probe)
        .await
}
