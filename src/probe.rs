//! Session probes
//!
//! A probe exercises a live session against the target account to prove the
//! credential is actually usable, not merely well-formed.

use crate::error::ProbeError;
use crate::session::MainSession;
use async_trait::async_trait;
use aws_config::Region;
use tracing::debug;

/// Checks whether a session works
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self, session: &MainSession) -> Result<(), ProbeError>;
}

/// Calls `sts:GetCallerIdentity` with the session's credentials
///
/// Needs no resource in the target account; rejects revoked or expired keys.
#[derive(Debug, Clone, Default)]
pub struct CallerIdentityProbe;

#[async_trait]
impl Probe for CallerIdentityProbe {
    async fn check(&self, session: &MainSession) -> Result<(), ProbeError> {
        let client = aws_sdk_sts::Client::new(session.sdk_config());
        let identity = client.get_caller_identity().send().await.map_err(|e| {
            ProbeError::new(
                "caller-identity",
                aws_sdk_sts::error::DisplayErrorContext(&e).to_string(),
            )
        })?;
        debug!("Session resolves to {:?}", identity.arn());
        Ok(())
    }
}

/// Lists at most one object of a bucket in the target account
#[derive(Debug, Clone)]
pub struct S3ListObjectsProbe {
    pub bucket: String,
    pub region: Option<String>,
}

impl S3ListObjectsProbe {
    pub fn new(bucket: impl Into<String>, region: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region,
        }
    }
}

#[async_trait]
impl Probe for S3ListObjectsProbe {
    async fn check(&self, session: &MainSession) -> Result<(), ProbeError> {
        let mut builder = aws_sdk_s3::config::Builder::from(session.sdk_config());
        if let Some(region) = &self.region {
            builder = builder.region(Region::new(region.clone()));
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());

        client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| {
                ProbeError::new(
                    "s3-list-objects",
                    format!(
                        "s3://{}: {}",
                        self.bucket,
                        aws_sdk_s3::error::DisplayErrorContext(&e)
                    ),
                )
            })?;

        debug!("Listed s3://{} with session credentials", self.bucket);
        Ok(())
    }
}
