use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use helpdesk_api::{
    ArtifactSink, Credentials, ExportSummary, Exporter, FnSink, HelpdeskClient, HelpdeskConfig,
};
use log::{debug, info};

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod secrets;

use cli::Cli;
use config::{Settings, SettingsManager};
use error::AppError;
use output::DirectorySink;

/// Effective options for one run after merging CLI, environment and persisted settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub domain: String,
    pub credentials: Credentials,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: u32,
    pub dry_run: bool,
}

impl RunOptions {
    /// CLI flags (and their environment fallbacks) win over stored settings.
    pub fn resolve(cli: &Cli, settings: &Settings) -> Result<Self, AppError> {
        let domain = cli
            .domain
            .as_deref()
            .or(settings.domain.as_deref())
            .map(normalize_domain)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Config("a domain is required (--domain or HELPDESK_DOMAIN)".into()))?;

        let user = cli.user.as_deref().or(settings.user.as_deref());
        let credentials =
            secrets::resolve_credentials(user, cli.password.as_deref(), cli.api_token.as_deref())?;

        Ok(Self {
            domain,
            credentials,
            output_dir: cli.output.clone().unwrap_or_else(|| settings.output_dir.clone()),
            concurrency: cli.concurrency.unwrap_or(settings.concurrency).max(1),
            read_timeout: Duration::from_secs(cli.read_timeout),
            connect_timeout: Duration::from_secs(cli.connect_timeout),
            max_redirects: cli.max_redirects,
            dry_run: cli.dry_run,
        })
    }

    pub fn helpdesk_config(&self) -> HelpdeskConfig {
        HelpdeskConfig::new(self.domain.clone(), self.credentials.clone())
            .with_concurrency(self.concurrency)
            .with_read_timeout(self.read_timeout)
            .with_connect_timeout(self.connect_timeout)
            .with_max_redirects(self.max_redirects)
    }
}

/// Accepts `acme.zendesk.com`, `https://acme.zendesk.com/` and similar spellings.
fn normalize_domain(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .format_timestamp_secs()
    .try_init();
}

/// Runs one export with an explicit sink.
pub async fn export<S>(config: HelpdeskConfig, sink: S) -> Result<ExportSummary, AppError>
where
    S: ArtifactSink,
{
    let client = HelpdeskClient::new(config)?;
    let exporter = Exporter::new(client, sink);
    Ok(exporter.run().await?)
}

/// Binary entry point: parses the command line, merges settings and runs a full export.
pub async fn run() -> Result<ExportSummary, AppError> {
    // .env values must be visible before clap reads environment fallbacks
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let manager = SettingsManager::new()?;
    let settings = manager.load();
    debug!("loaded settings from {}", manager.path().display());

    let options = RunOptions::resolve(&cli, &settings)?;
    if cli.save_settings {
        let updated = Settings {
            domain: Some(options.domain.clone()),
            user: Some(cli.user.clone().or(settings.user.clone()).unwrap_or_default()),
            output_dir: options.output_dir.clone(),
            concurrency: options.concurrency,
        };
        manager.save(&updated)?;
        info!("saved settings to {}", manager.path().display());
    }

    info!(
        "exporting {} as {} into {}",
        options.domain,
        options.credentials.identity(),
        options.output_dir.display()
    );

    let sink: Arc<dyn ArtifactSink> = if options.dry_run {
        Arc::new(FnSink::new(|path, bytes| {
            info!("would write {} ({} bytes)", path, bytes.len());
            Ok(())
        }))
    } else {
        Arc::new(DirectorySink::new(options.output_dir.clone()))
    };

    let summary = export(options.helpdesk_config(), sink).await?;
    info!(
        "done: {} artifacts ({} users, {} organizations, {} tickets, {} attachments), {} entities and {} files not found",
        summary.artifacts,
        summary.users,
        summary.organizations,
        summary.tickets,
        summary.attachments,
        summary.skipped_entities,
        summary.skipped_files
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{normalize_domain, RunOptions};
    use crate::cli::Cli;
    use crate::config::Settings;
    use clap::Parser;
    use std::path::PathBuf;
    use std::time::Duration;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["helpdesk-dumper"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn domain_spellings_are_normalized() {
        assert_eq!(normalize_domain("https://acme.zendesk.com/"), "acme.zendesk.com");
        assert_eq!(normalize_domain(" acme.zendesk.com "), "acme.zendesk.com");
    }

    #[test]
    fn cli_overrides_settings() {
        let settings = Settings {
            domain: Some("stored.zendesk.com".to_string()),
            user: Some("stored@example.com".to_string()),
            output_dir: PathBuf::from("stored"),
            concurrency: 10,
        };
        let options = RunOptions::resolve(
            &cli(&["-d", "acme.zendesk.com", "-p", "pw", "-c", "4"]),
            &settings,
        )
        .unwrap();

        assert_eq!(options.domain, "acme.zendesk.com");
        assert_eq!(options.credentials.identity(), "stored@example.com");
        assert_eq!(options.output_dir, PathBuf::from("stored"));
        assert_eq!(options.concurrency, 4);
        let config = options.helpdesk_config();
        assert_eq!(config.api_root(), "https://acme.zendesk.com/api/v2/");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.read_timeout, Duration::from_secs(120));
    }

    #[test]
    fn missing_domain_is_reported() {
        let err = RunOptions::resolve(&cli(&["-u", "a@example.com", "-p", "pw"]), &Settings::default())
            .unwrap_err();
        assert!(err.to_string().contains("domain"));
    }
}
