//! awsbastion - assume main-account roles from a bastion account with MFA
//!
//! Temporary credentials are cached on disk and validated with a probe
//! before use, so the MFA code is only asked for when they stop working.
//!
//! ```rust,ignore
//! use awsbastion::probe::S3ListObjectsProbe;
//! use awsbastion::session::{session_with_config, SessionConfig};
//!
//! let config = SessionConfig::new("bastion", "arn:aws:iam::210987654321:role/admin")
//!     .with_region("eu-west-1");
//! let probe = S3ListObjectsProbe::new("smoke-test-bucket", None);
//! let session = session_with_config(&config, &probe).await?;
//! let s3 = aws_sdk_s3::Client::new(session.sdk_config());
//! ```

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod probe;
pub mod session;
pub mod ui;

pub use error::{BastionError, BastionResult};
