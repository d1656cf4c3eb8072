//! CLI command implementations

pub mod config;
pub mod purge;
pub mod session;
pub mod status;

pub use config::execute as config;
pub use purge::execute as purge;
pub use session::execute as session;
pub use status::execute as status;
