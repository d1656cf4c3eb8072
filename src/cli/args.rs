//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// awsbastion - assume main-account roles from a bastion account with MFA
///
/// Temporary credentials are cached so the MFA code is only asked for when
/// the cached ones stop working.
#[derive(Parser, Debug)]
#[command(name = "awsbastion")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "AWSBASTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Credential cache file
    #[arg(long, global = true)]
    pub cache_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire a validated session and print its credentials
    Session(SessionArgs),

    /// Show the state of the credential cache
    Status,

    /// Delete the cached credential
    Purge,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// How session credentials are printed
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Shell `export` lines for eval
    #[default]
    Env,
    /// A JSON object
    Json,
}

/// Arguments for the session command
#[derive(Parser, Debug, Default)]
pub struct SessionArgs {
    /// Bastion profile in the shared AWS config
    #[arg(short, long, env = "AWSBASTION_PROFILE")]
    pub profile: Option<String>,

    /// Role ARN to assume in the main account
    #[arg(short, long, env = "AWSBASTION_ROLE_ARN")]
    pub role_arn: Option<String>,

    /// Region for STS and the main-account session
    #[arg(long)]
    pub region: Option<String>,

    /// MFA device ARN (discovered from the bastion user if omitted)
    #[arg(long)]
    pub mfa_serial: Option<String>,

    /// Validate by listing this S3 bucket instead of GetCallerIdentity
    #[arg(long)]
    pub bucket: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
