//! Status command - report what the credential cache holds

use crate::credentials::{CredentialStore, FileStore};
use crate::error::{BastionResult, CacheError};
use crate::ui::{self, UiContext};
use chrono::Utc;
use std::path::Path;

/// Execute the status command
pub async fn execute(cache_path: &Path) -> BastionResult<()> {
    let ctx = UiContext::detect();
    let store = FileStore::new(cache_path);

    ui::key_value(&ctx, "Cache file", &store.path().display().to_string());

    match store.load().await {
        Ok(cred) if cred.is_expired() => {
            ui::key_value_status(&ctx, "Credential", &cred.access_key_id, false);
            ui::step_warn_hint(
                &ctx,
                "Cached credential has expired",
                "The next session will ask for MFA",
            );
        }
        Ok(cred) => {
            ui::key_value_status(&ctx, "Credential", &cred.access_key_id, true);
            match cred.expiration {
                Some(expires_at) => {
                    let left = expires_at - Utc::now();
                    ui::key_value(
                        &ctx,
                        "Expires",
                        &format!(
                            "{} ({} min left)",
                            expires_at.to_rfc3339(),
                            left.num_minutes()
                        ),
                    );
                }
                None => ui::key_value(&ctx, "Expires", "unknown"),
            }
        }
        Err(CacheError::NotFound(_)) => {
            ui::key_value_status(&ctx, "Credential", "none", false);
        }
        Err(e @ CacheError::Corrupt { .. }) => {
            ui::key_value_status(&ctx, "Credential", "corrupt", false);
            ui::step_warn_hint(&ctx, &e.to_string(), "Run: awsbastion purge");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
