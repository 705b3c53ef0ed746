//! Command-line surface of the dump tool.

use std::path::PathBuf;

use clap::Parser;
use helpdesk_api::config::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_REDIRECTS, DEFAULT_READ_TIMEOUT_SECS,
};

/// Upper bound on concurrent per-entity workers.
pub const MAX_CONCURRENCY: usize = 200;

/// Parse and validate a worker count.
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Dump users, organizations, tickets, comments and attachments of a helpdesk domain into a directory tree.
#[derive(Debug, Parser)]
#[command(name = "helpdesk-dumper", version)]
pub struct Cli {
    /// Helpdesk host, e.g. `acme.zendesk.com`
    #[arg(long, short = 'd', env = "HELPDESK_DOMAIN")]
    pub domain: Option<String>,

    /// Agent login (email)
    #[arg(long, short = 'u', env = "HELPDESK_USER")]
    pub user: Option<String>,

    /// Agent password
    #[arg(long, short = 'p', env = "HELPDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// API token; authenticates as `<user>/token` instead of using a password
    #[arg(long, env = "HELPDESK_TOKEN", hide_env_values = true, conflicts_with = "password")]
    pub api_token: Option<String>,

    /// Output directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Maximum concurrent per-entity workers
    #[arg(long, short = 'c', value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Seconds of silence tolerated while a response or download is in progress
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_READ_TIMEOUT_SECS)]
    pub read_timeout: u64,

    /// Seconds allowed for establishing a connection
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Requests allowed per attachment download, redirects included
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_redirects: u32,

    /// Fetch everything but only log artifact paths instead of writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Store domain, user, output and concurrency as defaults for later runs
    #[arg(long)]
    pub save_settings: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
