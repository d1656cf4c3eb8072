//! Session command - acquire a validated session and print its credentials

use crate::cli::args::{OutputFormat, SessionArgs};
use crate::config::schema::ProbeKind;
use crate::config::Config;
use crate::error::{BastionError, BastionResult};
use crate::probe::{CallerIdentityProbe, Probe, S3ListObjectsProbe};
use crate::session::{Bastion, MainSession, SessionConfig};
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::path::Path;

/// Execute the session command
pub async fn execute(args: SessionArgs, config: &Config, cache_path: &Path) -> BastionResult<()> {
    let session_config = session_config(&args, config)?;
    let probe = select_probe(&args, config)?;

    let ctx = UiContext::detect();
    let bastion = Bastion::interactive(cache_path, ctx.clone());
    let session = bastion.acquire(&session_config, probe.as_ref()).await?;

    ui::step_ok_detail(&ctx, "Session ready", &session_config.role_arn);
    print!("{}", render(&session, args.format)?);
    Ok(())
}

/// Flags override the `[bastion]` section
fn session_config(args: &SessionArgs, config: &Config) -> BastionResult<SessionConfig> {
    let mut bastion = config.bastion.clone();
    if let Some(profile) = &args.profile {
        bastion.profile = profile.clone();
    }
    if args.role_arn.is_some() {
        bastion.role_arn = args.role_arn.clone();
    }
    if args.region.is_some() {
        bastion.region = args.region.clone();
    }
    if args.mfa_serial.is_some() {
        bastion.mfa_serial = args.mfa_serial.clone();
    }
    bastion.to_session_config()
}

fn select_probe(args: &SessionArgs, config: &Config) -> BastionResult<Box<dyn Probe>> {
    if let Some(bucket) = &args.bucket {
        return Ok(Box::new(S3ListObjectsProbe::new(
            bucket.clone(),
            config.probe.region.clone(),
        )));
    }

    match config.probe.kind {
        ProbeKind::CallerIdentity => Ok(Box::new(CallerIdentityProbe)),
        ProbeKind::S3ListObjects => {
            let bucket = config
                .probe
                .bucket
                .clone()
                .ok_or(BastionError::MissingSetting("probe.bucket"))?;
            Ok(Box::new(S3ListObjectsProbe::new(
                bucket,
                config.probe.region.clone(),
            )))
        }
    }
}

/// `credential_process` output shape
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessCredentials<'a> {
    version: u8,
    access_key_id: &'a str,
    secret_access_key: &'a str,
    session_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<String>,
}

fn render(session: &MainSession, format: OutputFormat) -> BastionResult<String> {
    let cred = session.credential();
    match format {
        OutputFormat::Env => {
            let vars = [
                ("AWS_ACCESS_KEY_ID", cred.access_key_id.as_str()),
                ("AWS_SECRET_ACCESS_KEY", cred.secret_access_key.as_str()),
                ("AWS_SESSION_TOKEN", cred.session_token.as_str()),
                ("AWS_REGION", session.region()),
            ];
            Ok(vars
                .iter()
                .map(|(name, value)| format!("export {}={}\n", name, shell_quote(value)))
                .collect())
        }
        OutputFormat::Json => {
            let out = ProcessCredentials {
                version: 1,
                access_key_id: &cred.access_key_id,
                secret_access_key: &cred.secret_access_key,
                session_token: &cred.session_token,
                expiration: cred.expiration.map(|e| e.to_rfc3339()),
            };
            Ok(format!("{}\n", serde_json::to_string_pretty(&out)?))
        }
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
