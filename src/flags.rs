use std::path::PathBuf;

use clap::Parser;

use crate::store::StoreOptions;

/// A simple shell to interact with DynamoDB.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "dynash", version, about)]
pub struct Flags {
    /// AWS region to connect to
    #[arg(short, long)]
    pub region: Option<String>,

    /// Named profile from the AWS config files
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Endpoint override, e.g. http://localhost:8000 for DynamoDB Local
    #[arg(short, long = "endpoint-url", value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Table to use at startup
    #[arg(short, long)]
    pub table: Option<String>,

    /// Startup file of shell commands [default: ~/.dynashrc]
    #[arg(short, long, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Skip the startup file
    #[arg(long)]
    pub no_config: bool,

    /// Run a command and exit instead of prompting; may be repeated
    #[arg(short = 'x', long = "execute", value_name = "COMMAND")]
    pub execute: Vec<String>,

    /// Start with consistent reads enabled
    #[arg(long)]
    pub consistent: bool,

    /// Start with elapsed-time display enabled
    #[arg(long)]
    pub elapsed: bool,

    /// Suppress the greeting and farewell
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug output and detailed store errors
    #[arg(short, long)]
    pub debug: bool,
}

impl Flags {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            region: self.region.clone(),
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.execute.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_flags_definition() {
        Flags::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let flags = Flags::parse_from(["dynash"]);
        assert!(flags.is_interactive());
        assert!(!flags.quiet && !flags.debug && !flags.consistent && !flags.elapsed);
        assert!(flags.config.is_none());
    }

    #[test]
    fn test_connection_flags() {
        let flags = Flags::parse_from([
            "dynash",
            "-r",
            "eu-west-1",
            "--profile",
            "dev",
            "-e",
            "http://localhost:8000",
        ]);
        let options = flags.store_options();
        assert_eq!(options.region.as_deref(), Some("eu-west-1"));
        assert_eq!(options.profile.as_deref(), Some("dev"));
        assert_eq!(options.endpoint_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_execute_is_repeatable() {
        let flags = Flags::parse_from(["dynash", "-x", "tables", "--execute", "scan :users", "-t", "users"]);
        assert_eq!(flags.execute, vec!["tables", "scan :users"]);
        assert_eq!(flags.table.as_deref(), Some("users"));
        assert!(!flags.is_interactive());
    }

    #[test]
    fn test_config_conflicts_with_no_config() {
        assert!(Flags::try_parse_from(["dynash", "-c", "rc", "--no-config"]).is_err());
    }
}
