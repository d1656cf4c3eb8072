//! Terminal UI helpers
//!
//! Uses `cliclack` for prompts and log lines when attached to a terminal,
//! with plain stderr output otherwise.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{key_value, key_value_status, step_info, step_ok_detail, step_warn_hint};
pub use prompts::input;
