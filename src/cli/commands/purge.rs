//! Purge command - delete the cached credential

use crate::credentials::{CredentialStore, FileStore};
use crate::error::BastionResult;
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the purge command
pub async fn execute(cache_path: &Path) -> BastionResult<()> {
    let ctx = UiContext::detect();
    let store = FileStore::new(cache_path);
    let existed = store.path().exists();

    store.purge().await?;

    if existed {
        ui::step_ok_detail(
            &ctx,
            "Cached credential removed",
            &store.path().display().to_string(),
        );
    } else {
        ui::step_info(&ctx, "No cached credential");
    }
    Ok(())
}
